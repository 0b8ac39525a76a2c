//! ZIP packaging of converted files.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::info;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::batch::ConversionResult;
use crate::error::{ConvertError, Result};

/// Archive file name for `count` converted files.
pub fn archive_file_name(count: usize) -> String {
    format!("converted_files_{count}.zip")
}

/// Package the outputs of `successes` into a ZIP inside `dest_dir`.
///
/// Each output is stored under its file name. Failure results are ignored.
/// The archive is staged next to its final path, so a failed run leaves no
/// truncated ZIP behind.
pub fn write_archive(successes: &[ConversionResult], dest_dir: &Path) -> Result<PathBuf> {
    let outputs: Vec<&Path> = successes
        .iter()
        .filter_map(ConversionResult::output)
        .collect();
    let path = dest_dir.join(archive_file_name(outputs.len()));
    let archive_err = |message: String| ConvertError::Archive {
        path: path.clone(),
        message,
    };

    let temp = Builder::new()
        .prefix(".savx-")
        .suffix(".zip.tmp")
        .tempfile_in(dest_dir)
        .map_err(|err| archive_err(err.to_string()))?;
    let mut zip = ZipWriter::new(BufWriter::new(temp));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for output in &outputs {
        let name = output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| archive_err(format!("{} has no file name", output.display())))?;
        zip.start_file(name, options)
            .map_err(|err| archive_err(err.to_string()))?;
        let mut source = File::open(output)
            .map_err(|err| archive_err(format!("{}: {err}", output.display())))?;
        io::copy(&mut source, &mut zip).map_err(|err| archive_err(err.to_string()))?;
    }
    let temp = zip
        .finish()
        .map_err(|err| archive_err(err.to_string()))?
        .into_inner()
        .map_err(|err| archive_err(err.error().to_string()))?;
    temp.persist(&path)
        .map_err(|err| archive_err(err.error.to_string()))?;

    info!(archive = %path.display(), files = outputs.len(), "wrote archive");
    Ok(path)
}
