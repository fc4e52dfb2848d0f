//! Error types for tellus-io.

use std::path::PathBuf;

use tellus_dataset::DatasetError;

/// Error type for all fallible operations in the tellus-io crate.
///
/// Covers missing files, failures surfaced by the NetCDF library, and
/// files whose structure cannot be mapped onto a dataset.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when a file is readable but its contents cannot be
    /// interpreted: no dimensions, malformed georeferencing, coordinate
    /// values the data model rejects.
    #[error("format error: {reason}")]
    Format {
        /// Description of the structural problem.
        reason: String,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<DatasetError> for IoError {
    fn from(e: DatasetError) -> Self {
        IoError::Format {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
    }

    #[test]
    fn display_netcdf() {
        let err = IoError::Netcdf {
            reason: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "netcdf error: bad header");
    }

    #[test]
    fn display_format() {
        let err = IoError::Format {
            reason: "no dimensions".to_string(),
        };
        assert_eq!(err.to_string(), "format error: no dimensions");
    }

    #[test]
    fn from_netcdf_error() {
        let nc_err = netcdf::Error::Str("test nc error".to_string());
        let err: IoError = nc_err.into();
        assert!(matches!(err, IoError::Netcdf { .. }));
        assert!(err.to_string().contains("test nc error"));
    }

    #[test]
    fn from_dataset_error_is_format() {
        let ds_err = DatasetError::InvalidDimension {
            name: "time".to_string(),
            reason: "coordinates must be monotonically non-decreasing".to_string(),
        };
        let err: IoError = ds_err.into();
        assert!(matches!(err, IoError::Format { .. }));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
