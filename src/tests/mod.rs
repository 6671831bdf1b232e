mod test_data;
mod test_ingest;
mod test_recommend;
