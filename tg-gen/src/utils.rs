//! Output helpers for the command-line front end.

use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::SystemTime;

use anyhow::Result;
use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;
use serde_json::json;
use tracing::{
    debug,
    instrument,
};

/// Create a timestamped run directory under `base_dir` and write basic metadata into it.
#[instrument]
pub fn create_timestamped_output_dir(base_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(base_dir)?;

    let now: DateTime<Utc> = SystemTime::now().into();
    let timestamp = now.to_rfc3339().replace([':', '.'], "-"); // make filesystem-friendly
    let output_dir = base_dir.join(timestamp);
    std::fs::create_dir_all(&output_dir)?;

    let metadata = json!({
        "timestamp": now.to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "command_args": std::env::args().collect::<Vec<_>>()
    });
    write_json(&output_dir, "metadata.json", &metadata)?;

    Ok(output_dir)
}

/// Pretty-print `value` as JSON into `output_dir/filename` and return the path.
#[instrument(skip(value))]
pub fn write_json<T: Serialize + ?Sized>(output_dir: &Path, filename: &str, value: &T) -> Result<PathBuf> {
    let file_path = output_dir.join(filename);
    let mut writer = BufWriter::new(File::create(&file_path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    debug!("JSON written to: {}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    fn test_run_dir_holds_metadata_and_payload() {
        let base = std::env::temp_dir().join(format!("tracegen-utils-{}", std::process::id()));
        let dir = create_timestamped_output_dir(&base).unwrap();
        assert!(dir.starts_with(&base));
        assert!(dir.join("metadata.json").is_file());

        let path = write_json(&dir, "numbers.json", &[1, 2, 3]).unwrap();
        let back: Vec<u32> = serde_json::from_reader(File::open(path).unwrap()).unwrap();
        assert_eq!(back, [1, 2, 3]);

        std::fs::remove_dir_all(base).unwrap();
    }
}
