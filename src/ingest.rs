//! SMR matrix triplet files: reading, writing and the sparse-matrix view.
//!
//! A matrix named by a prefix is stored as three CSV files:
//! - `<prefix>-rownames.csv`: header, then `<id>,<item>` records (1-based ids by position)
//! - `<prefix>-colnames.csv`: header, then `<id>,<tag>` records
//! - `<prefix>.csv`: header, then `<row-id>,<col-id>,<weight>` coordinates
//!
//! Commas inside double quotes are part of the field and outer quotes are
//! stripped, also when whitespace precedes them. Duplicate coordinates are summed when the triplet matrix is
//! compressed, zero weights are dropped.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info, trace};
use sprs::{CsMat, TriMat};

use crate::error::{Result, SbrError};
use crate::index::InverseIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TripletPart {
    RowNames,
    ColNames,
    Entries,
}

impl TripletPart {
    pub const ALL: [TripletPart; 3] = [
        TripletPart::RowNames,
        TripletPart::ColNames,
        TripletPart::Entries,
    ];

    /// File name suffix appended to the prefix.
    pub fn suffix(self) -> &'static str {
        match self {
            TripletPart::RowNames => "-rownames.csv",
            TripletPart::ColNames => "-colnames.csv",
            TripletPart::Entries => ".csv",
        }
    }
}

/// Where the three streams of a matrix come from.
pub trait TripletSource {
    /// Human readable name of a part, used in error messages.
    fn label(&self, part: TripletPart) -> String;

    fn open(&self, part: TripletPart) -> Result<Box<dyn Read + '_>>;
}

/// Triplet files on disk named by a common prefix.
#[derive(Clone, Debug)]
pub struct PrefixSource {
    prefix: PathBuf,
}

impl PrefixSource {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Result<Self> {
        let prefix = prefix.as_ref();
        if prefix.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(SbrError::EmptyPrefix);
        }
        Ok(Self {
            prefix: prefix.to_path_buf(),
        })
    }

    pub fn path(&self, part: TripletPart) -> PathBuf {
        prefixed_path(&self.prefix, part)
    }
}

impl TripletSource for PrefixSource {
    fn label(&self, part: TripletPart) -> String {
        self.path(part).display().to_string()
    }

    fn open(&self, part: TripletPart) -> Result<Box<dyn Read + '_>> {
        let path = self.path(part);
        match File::open(&path) {
            Ok(f) => Ok(Box::new(io::BufReader::new(f))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SbrError::MissingFile(path)),
            Err(source) => Err(SbrError::Io {
                file: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Triplet held in memory, mostly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    pub rownames: String,
    pub colnames: String,
    pub entries: String,
}

impl MemorySource {
    pub fn new(
        rownames: impl Into<String>,
        colnames: impl Into<String>,
        entries: impl Into<String>,
    ) -> Self {
        Self {
            rownames: rownames.into(),
            colnames: colnames.into(),
            entries: entries.into(),
        }
    }
}

impl TripletSource for MemorySource {
    fn label(&self, part: TripletPart) -> String {
        format!("<memory>{}", part.suffix())
    }

    fn open(&self, part: TripletPart) -> Result<Box<dyn Read + '_>> {
        let text = match part {
            TripletPart::RowNames => &self.rownames,
            TripletPart::ColNames => &self.colnames,
            TripletPart::Entries => &self.entries,
        };
        Ok(Box::new(Cursor::new(text.as_bytes())))
    }
}

/// Parsed triplet: name tables plus the coordinate matrix (rows = items, cols = tags).
#[derive(Debug)]
pub struct SmrMatrix {
    pub row_names: Vec<String>,
    pub col_names: Vec<String>,
    pub matrix: TriMat<f64>,
}

impl SmrMatrix {
    pub fn read<S: TripletSource + ?Sized>(source: &S) -> Result<Self> {
        let row_label = source.label(TripletPart::RowNames);
        let row_names = read_names(source.open(TripletPart::RowNames)?, &row_label)?;
        let col_label = source.label(TripletPart::ColNames);
        let col_names = read_names(source.open(TripletPart::ColNames)?, &col_label)?;
        let entries_label = source.label(TripletPart::Entries);
        let matrix = read_entries(
            source.open(TripletPart::Entries)?,
            &entries_label,
            row_names.len(),
            col_names.len(),
        )?;
        info!(
            "Read SMR matrix: {} rows, {} columns, {} coordinates",
            row_names.len(),
            col_names.len(),
            matrix.nnz()
        );
        Ok(Self {
            row_names,
            col_names,
            matrix,
        })
    }

    /// Builds the triplet of a tag-keyed index; names are sorted so the
    /// output is deterministic.
    pub fn from_index(tag_index: &InverseIndex) -> Self {
        let col_names: Vec<String> = tag_index
            .sorted_keys()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut row_names: Vec<String> = tag_index
            .iter()
            .flat_map(|(_, s)| s.keys().cloned())
            .collect();
        row_names.sort_unstable();
        row_names.dedup();

        let mut matrix = TriMat::with_capacity((row_names.len(), col_names.len()), tag_index.nnz());
        for (col, tag) in col_names.iter().enumerate() {
            let Some(slice) = tag_index.slice(tag) else {
                continue;
            };
            let mut items: Vec<(&String, &f64)> = slice.iter().collect();
            items.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (item, &w) in items {
                // row_names holds every item of every slice
                if let Ok(row) = row_names.binary_search(item) {
                    matrix.add_triplet(row, col, w);
                }
            }
        }
        Self {
            row_names,
            col_names,
            matrix,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_names.len(), self.col_names.len())
    }

    /// Column-major compressed matrix, duplicate coordinates summed.
    pub fn to_csc(&self) -> CsMat<f64> {
        self.matrix.to_csc()
    }

    /// Tag → item → weight index of the matrix.
    pub fn tag_index(&self) -> InverseIndex {
        let csc = self.to_csc();
        let mut index = InverseIndex::new();
        for (col, column) in csc.outer_iterator().enumerate() {
            let tag = &self.col_names[col];
            for (row, &w) in column.iter() {
                index.insert(tag.as_str(), self.row_names[row].as_str(), w);
            }
        }
        debug!(
            "Tag index built: {} tags, {} entries",
            index.len(),
            index.nnz()
        );
        index
    }

    pub fn write<W1: Write, W2: Write, W3: Write>(
        &self,
        rownames: W1,
        colnames: W2,
        entries: W3,
    ) -> Result<()> {
        write_names(rownames, &self.row_names, "rownames")?;
        write_names(colnames, &self.col_names, "colnames")?;

        let mut wtr = WriterBuilder::new().from_writer(entries);
        let csv_err = |source| SbrError::Csv {
            file: "entries".to_string(),
            source,
        };
        wtr.write_record(["i", "j", "x"]).map_err(csv_err)?;
        let tri = &self.matrix;
        for ((&row, &col), &w) in tri.row_inds().iter().zip(tri.col_inds()).zip(tri.data()) {
            wtr.write_record([
                (row + 1).to_string(),
                (col + 1).to_string(),
                w.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush().map_err(|source| SbrError::Io {
            file: "entries".to_string(),
            source,
        })
    }

    /// Writes the three files next to each other under `prefix`.
    pub fn write_prefix<P: AsRef<Path>>(&self, prefix: P) -> Result<()> {
        let source = PrefixSource::new(prefix)?;
        let create = |part| {
            let path = source.path(part);
            File::create(&path).map_err(|e| SbrError::Io {
                file: path.display().to_string(),
                source: e,
            })
        };
        self.write(
            io::BufWriter::new(create(TripletPart::RowNames)?),
            io::BufWriter::new(create(TripletPart::ColNames)?),
            io::BufWriter::new(create(TripletPart::Entries)?),
        )?;
        info!("Wrote SMR matrix files with prefix: {}", source.prefix.display());
        Ok(())
    }
}

fn prefixed_path(prefix: &Path, part: TripletPart) -> PathBuf {
    let mut name: OsString = prefix.as_os_str().to_owned();
    name.push(part.suffix());
    PathBuf::from(name)
}

/// Drops one pair of outer quotes the csv reader left in place, as in
/// `1, "name"` where whitespace precedes the opening quote.
fn unquote(field: &str) -> &str {
    field
        .trim()
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Reads a names file; the second field of each record is the name.
pub fn read_names<R: Read>(reader: R, file: &str) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut names = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|source| SbrError::Csv {
            file: file.to_string(),
            source,
        })?;
        let name = record.get(1).ok_or_else(|| SbrError::Parse {
            file: file.to_string(),
            line: record_line(&record),
            message: format!("expected at least 2 fields, found {}", record.len()),
        })?;
        names.push(unquote(name).to_string());
    }
    trace!("Read {} names from {}", names.len(), file);
    Ok(names)
}

/// Reads the coordinate file into a `nrows × ncols` triplet matrix.
pub fn read_entries<R: Read>(
    reader: R,
    file: &str,
    nrows: usize,
    ncols: usize,
) -> Result<TriMat<f64>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut matrix = TriMat::new((nrows, ncols));
    for record in rdr.records() {
        let record = record.map_err(|source| SbrError::Csv {
            file: file.to_string(),
            source,
        })?;
        let line = record_line(&record);
        if record.len() < 3 {
            return Err(SbrError::Parse {
                file: file.to_string(),
                line,
                message: format!("expected 3 fields, found {}", record.len()),
            });
        }
        let row = parse_id(unquote(&record[0]), "row", nrows, file, line)?;
        let col = parse_id(unquote(&record[1]), "column", ncols, file, line)?;
        let weight: f64 = unquote(&record[2]).trim().parse().map_err(|e| SbrError::Parse {
            file: file.to_string(),
            line,
            message: format!("invalid weight {:?}: {e}", &record[2]),
        })?;
        if !weight.is_finite() {
            return Err(SbrError::NonFiniteWeight {
                file: file.to_string(),
                line,
            });
        }
        if weight != 0.0 {
            matrix.add_triplet(row, col, weight);
        }
    }
    Ok(matrix)
}

/// Parses a 1-based id and returns the 0-based index.
fn parse_id(field: &str, axis: &'static str, max: usize, file: &str, line: u64) -> Result<usize> {
    let id: i64 = field.trim().parse().map_err(|e| SbrError::Parse {
        file: file.to_string(),
        line,
        message: format!("invalid {axis} id {field:?}: {e}"),
    })?;
    if id < 1 || id as u64 > max as u64 {
        return Err(SbrError::IdOutOfRange {
            file: file.to_string(),
            line,
            axis,
            id,
            max,
        });
    }
    Ok((id - 1) as usize)
}

fn write_names<W: Write>(writer: W, names: &[String], file: &str) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    let csv_err = |source| SbrError::Csv {
        file: file.to_string(),
        source,
    };
    wtr.write_record(["", "x"]).map_err(csv_err)?;
    for (i, name) in names.iter().enumerate() {
        wtr.write_record([(i + 1).to_string().as_str(), name.as_str()])
            .map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| SbrError::Io {
        file: file.to_string(),
        source,
    })
}
