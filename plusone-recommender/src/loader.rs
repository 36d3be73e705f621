// ---------------------------------------------------------------------------
// Catalog + matrix loading (JSON, NumPy .npy, optional gzip)
// ---------------------------------------------------------------------------
//
// Catalog: JSON array of entry objects.
//
// Matrix: either a JSON array of equal-length numeric arrays, or a NumPy
// `.npy` file:
//   [6B magic \x93NUMPY][1B major][1B minor]
//   [2B header-len LE (v1) | 4B header-len LE (v2, v3)]
//   [header: Python dict literal with descr, fortran_order, shape]
//   [raw element data]
//
// Either file may be gzip-compressed; compression is detected from the
// magic bytes, not the extension. Nothing partial is ever returned.
// ---------------------------------------------------------------------------

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use regex::Regex;
use thiserror::Error;

use crate::error::RankError;
use crate::matrix::CorrelationMatrix;
use crate::types::Entry;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Corruption: {0}")]
	Corruption(String),
	#[error("Serialization: {0}")]
	Serialization(String),
	#[error("Unsupported format: {0}")]
	Unsupported(String),
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const NPY_MAGIC: &[u8] = b"\x93NUMPY";

// ---------------------------------------------------------------------------
// Gzip
// ---------------------------------------------------------------------------

/// Check if data starts with gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Gunzip-decompress a byte slice.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, LoadError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder.read_to_end(&mut decompressed)?;
	Ok(decompressed)
}

/// Read a file, transparently gunzipping it.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
	let raw = std::fs::read(path)?;
	if is_gzipped(&raw) {
		decompress(&raw)
	} else {
		Ok(raw)
	}
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub fn load_catalog(path: &Path) -> Result<Vec<Entry>, LoadError> {
	let bytes = read_bytes(path)?;
	let entries: Vec<Entry> = serde_json::from_slice(&bytes)
		.map_err(|e| LoadError::Serialization(format!("Invalid catalog: {}", e)))?;
	tracing::info!(path = %path.display(), entries = entries.len(), "Loaded catalog");
	Ok(entries)
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

pub fn load_matrix(path: &Path) -> Result<CorrelationMatrix, LoadError> {
	let bytes = read_bytes(path)?;
	let matrix = if bytes.starts_with(NPY_MAGIC) {
		decode_npy(&bytes)?
	} else {
		decode_json_matrix(&bytes)?
	};
	tracing::info!(path = %path.display(), size = matrix.size(), "Loaded correlation matrix");
	Ok(matrix)
}

pub fn decode_json_matrix(bytes: &[u8]) -> Result<CorrelationMatrix, LoadError> {
	let rows: Vec<Vec<f64>> = serde_json::from_slice(bytes)
		.map_err(|e| LoadError::Serialization(format!("Invalid matrix: {}", e)))?;
	CorrelationMatrix::from_rows(rows).map_err(invalid_matrix)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Dtype {
	F64 { little_endian: bool },
	F32 { little_endian: bool },
}

impl Dtype {
	fn parse(descr: &str) -> Result<Self, LoadError> {
		match descr {
			"<f8" => Ok(Self::F64 { little_endian: true }),
			">f8" => Ok(Self::F64 { little_endian: false }),
			"<f4" => Ok(Self::F32 { little_endian: true }),
			">f4" => Ok(Self::F32 { little_endian: false }),
			other => Err(LoadError::Unsupported(format!("npy dtype {}", other))),
		}
	}

	fn width(self) -> usize {
		match self {
			Self::F64 { .. } => 8,
			Self::F32 { .. } => 4,
		}
	}

	fn read(self, chunk: &[u8]) -> f64 {
		match self {
			Self::F64 { little_endian } => {
				let mut b = [0u8; 8];
				b.copy_from_slice(chunk);
				if little_endian {
					f64::from_le_bytes(b)
				} else {
					f64::from_be_bytes(b)
				}
			}
			Self::F32 { little_endian } => {
				let b = [chunk[0], chunk[1], chunk[2], chunk[3]];
				let v = if little_endian {
					f32::from_le_bytes(b)
				} else {
					f32::from_be_bytes(b)
				};
				v as f64
			}
		}
	}
}

struct NpyHeader {
	dtype: Dtype,
	fortran_order: bool,
	shape: Vec<usize>,
}

fn parse_npy_header(header: &str) -> Result<NpyHeader, LoadError> {
	let field = |pattern: &str| -> Result<String, LoadError> {
		let re = Regex::new(pattern)
			.map_err(|e| LoadError::Corruption(format!("Header pattern: {}", e)))?;
		re.captures(header)
			.and_then(|c| c.get(1))
			.map(|m| m.as_str().to_string())
			.ok_or_else(|| LoadError::Corruption(format!("npy header missing {}", pattern)))
	};

	let dtype = Dtype::parse(&field(r"'descr'\s*:\s*'([^']*)'")?)?;
	let fortran_order = field(r"'fortran_order'\s*:\s*(True|False)")? == "True";
	let shape = field(r"'shape'\s*:\s*\(([^)]*)\)")?
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(|s| {
			s.parse::<usize>()
				.map_err(|e| LoadError::Corruption(format!("npy shape {:?}: {}", s, e)))
		})
		.collect::<Result<Vec<_>, _>>()?;

	Ok(NpyHeader {
		dtype,
		fortran_order,
		shape,
	})
}

/// Decode a 2-D square NumPy array.
pub fn decode_npy(bytes: &[u8]) -> Result<CorrelationMatrix, LoadError> {
	if !bytes.starts_with(NPY_MAGIC) || bytes.len() < 10 {
		return Err(LoadError::Corruption("Not an npy file".into()));
	}
	let major = bytes[6];
	let (header_len, header_start) = match major {
		1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
		2 | 3 => {
			if bytes.len() < 12 {
				return Err(LoadError::Corruption("Truncated npy preamble".into()));
			}
			(
				u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
				12,
			)
		}
		v => return Err(LoadError::Unsupported(format!("npy version {}", v))),
	};

	let data_start = header_start + header_len;
	if bytes.len() < data_start {
		return Err(LoadError::Corruption("Truncated npy header".into()));
	}
	let header = std::str::from_utf8(&bytes[header_start..data_start])
		.map_err(|e| LoadError::Corruption(format!("npy header: {}", e)))?;
	let header = parse_npy_header(header)?;

	let size = match header.shape.as_slice() {
		[rows, cols] if rows == cols => *rows,
		shape => {
			return Err(LoadError::Corruption(format!(
				"Expected a square 2-D matrix, got shape {:?}",
				shape
			)))
		}
	};

	let width = header.dtype.width();
	let expected = size
		.checked_mul(size)
		.and_then(|n| n.checked_mul(width))
		.ok_or_else(|| {
			LoadError::Corruption(format!("npy shape ({}, {}) is too large", size, size))
		})?;
	let data = &bytes[data_start..];
	if data.len() != expected {
		return Err(LoadError::Corruption(format!(
			"npy data is {} bytes, expected {}",
			data.len(),
			expected
		)));
	}

	let mut values: Vec<f64> = data
		.chunks_exact(width)
		.map(|c| header.dtype.read(c))
		.collect();

	if header.fortran_order {
		let column_major = values;
		values = vec![0.0; size * size];
		for col in 0..size {
			for row in 0..size {
				values[row * size + col] = column_major[col * size + row];
			}
		}
	}

	CorrelationMatrix::from_row_major(size, values).map_err(invalid_matrix)
}

fn invalid_matrix(err: RankError) -> LoadError {
	LoadError::Corruption(err.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn npy_bytes(descr: &str, fortran: bool, shape: (usize, usize), data: &[u8]) -> Vec<u8> {
	let mut header = format!(
		"{{'descr': '{}', 'fortran_order': {}, 'shape': ({}, {}), }}",
		descr,
		if fortran { "True" } else { "False" },
		shape.0,
		shape.1
	);
	// pad so the data starts on a 64-byte boundary, newline-terminated
	let unpadded = 10 + header.len() + 1;
	header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
	header.push('\n');

	let mut out = Vec::new();
	out.extend_from_slice(NPY_MAGIC);
	out.extend_from_slice(&[1, 0]);
	out.extend_from_slice(&(header.len() as u16).to_le_bytes());
	out.extend_from_slice(header.as_bytes());
	out.extend_from_slice(data);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use flate2::write::GzEncoder;
	use flate2::Compression;
	use std::io::Write;

	fn f64_le(values: &[f64]) -> Vec<u8> {
		values.iter().flat_map(|v| v.to_le_bytes()).collect()
	}

	fn gzip(data: &[u8]) -> Vec<u8> {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(data).unwrap();
		encoder.finish().unwrap()
	}

	// -- npy ----------------------------------------------------------------

	#[test]
	fn decodes_c_order_f8() {
		let data = f64_le(&[0.0, 0.2, 0.8, 0.2, 0.0, 0.5, 0.8, 0.5, 0.0]);
		let m = decode_npy(&npy_bytes("<f8", false, (3, 3), &data)).unwrap();
		assert_eq!(m.size(), 3);
		assert_eq!(m.row(0).unwrap(), &[0.0, 0.2, 0.8]);
		assert_eq!(m.row(2).unwrap(), &[0.8, 0.5, 0.0]);
	}

	#[test]
	fn decodes_fortran_order() {
		// column-major [[1, 2], [3, 4]]
		let data = f64_le(&[1.0, 3.0, 2.0, 4.0]);
		let m = decode_npy(&npy_bytes("<f8", true, (2, 2), &data)).unwrap();
		assert_eq!(m.row(0).unwrap(), &[1.0, 2.0]);
		assert_eq!(m.row(1).unwrap(), &[3.0, 4.0]);
	}

	#[test]
	fn decodes_f4() {
		let data: Vec<u8> = [0.5f32, 0.25, 0.75, 1.0]
			.iter()
			.flat_map(|v| v.to_le_bytes())
			.collect();
		let m = decode_npy(&npy_bytes("<f4", false, (2, 2), &data)).unwrap();
		assert_eq!(m.row(1).unwrap(), &[0.75, 1.0]);
	}

	#[test]
	fn rejects_non_square_shape() {
		let data = f64_le(&[0.0; 6]);
		let err = decode_npy(&npy_bytes("<f8", false, (2, 3), &data)).unwrap_err();
		assert!(matches!(err, LoadError::Corruption(_)));
	}

	#[test]
	fn rejects_truncated_data() {
		let data = f64_le(&[0.0; 3]);
		assert!(decode_npy(&npy_bytes("<f8", false, (2, 2), &data)).is_err());
	}

	#[test]
	fn rejects_shape_whose_byte_count_overflows() {
		let bytes = npy_bytes("<f8", false, (1 << 32, 1 << 32), &[]);
		match decode_npy(&bytes) {
			Err(LoadError::Corruption(msg)) => assert!(msg.contains("too large")),
			other => panic!("expected corruption error, got {:?}", other),
		}
	}

	#[test]
	fn rejects_integer_dtype() {
		let data = vec![0u8; 32];
		let err = decode_npy(&npy_bytes("<i8", false, (2, 2), &data)).unwrap_err();
		assert!(matches!(err, LoadError::Unsupported(_)));
	}

	#[test]
	fn rejects_nan_values() {
		let data = f64_le(&[0.0, f64::NAN, 0.1, 0.0]);
		assert!(decode_npy(&npy_bytes("<f8", false, (2, 2), &data)).is_err());
	}

	// -- json ---------------------------------------------------------------

	#[test]
	fn decodes_json_matrix() {
		let m = decode_json_matrix(b"[[0, 0.5], [0.5, 0]]").unwrap();
		assert_eq!(m.row(1).unwrap(), &[0.5, 0.0]);
	}

	#[test]
	fn rejects_ragged_json_matrix() {
		assert!(decode_json_matrix(b"[[0, 0.5], [0.5]]").is_err());
		assert!(decode_json_matrix(b"{\"not\": \"a matrix\"}").is_err());
	}

	// -- files --------------------------------------------------------------

	#[test]
	fn loads_gzipped_npy_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("correlation.npy.gz");
		let data = f64_le(&[0.0, 0.3, 0.3, 0.0]);
		std::fs::write(&path, gzip(&npy_bytes("<f8", false, (2, 2), &data))).unwrap();
		let m = load_matrix(&path).unwrap();
		assert!((m.get(0, 1).unwrap() - 0.3).abs() < 1e-10);
	}

	#[test]
	fn loads_json_catalog() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("catalog.json");
		std::fs::write(
			&path,
			r#"[
				{"id": 1, "uid": "u1", "url": "https://example.com/1", "title": "One",
				 "status": "published", "number": 1, "subtitle": "", "related": ["a"],
				 "content": "body", "wordCount": 12}
			]"#,
		)
		.unwrap();
		let entries = load_catalog(&path).unwrap();
		assert_eq!(entries.len(), 1);
		assert_eq!(entries[0].id, "1");
		assert_eq!(entries[0].word_count, 12);
	}

	#[test]
	fn missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = load_catalog(&dir.path().join("absent.json")).unwrap_err();
		assert!(matches!(err, LoadError::Io(_)));
	}

	#[test]
	fn gzip_detection() {
		assert!(is_gzipped(&gzip(b"[]")));
		assert!(!is_gzipped(b"[]"));
		assert!(!is_gzipped(&[0x1f]));
	}
}
