//! File-to-file PCM wrapping.

use std::path::{Path, PathBuf};

use apnatoon_audio::domain::wav::pcm_to_wav;
use tracing::info;

use crate::error::AppError;

/// Parsed `apnatoon-pcm2wav` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm2WavArgs {
    /// Raw PCM file to read.
    pub input: PathBuf,
    /// Container file to write.
    pub output: PathBuf,
}

impl Pcm2WavArgs {
    /// Parses the arguments after the program name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` unless exactly two paths are given.
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        match (args.next(), args.next(), args.next()) {
            (Some(input), Some(output), None) => Ok(Self {
                input: input.into(),
                output: output.into(),
            }),
            _ => Err(AppError::Usage(
                "apnatoon-pcm2wav <input.pcm> <output.wav>".to_owned(),
            )),
        }
    }
}

/// Reads raw PCM from `input`, wraps it, and writes the container to
/// `output`. Returns the number of bytes written.
///
/// # Errors
///
/// Returns `AppError::Io` if either file cannot be accessed.
pub async fn convert_file(input: &Path, output: &Path, sample_rate: u32) -> Result<usize, AppError> {
    let pcm = tokio::fs::read(input).await?;
    let container = pcm_to_wav(&pcm, sample_rate);
    tokio::fs::write(output, &container).await?;
    info!(
        input = %input.display(),
        output = %output.display(),
        pcm_bytes = pcm.len(),
        sample_rate,
        "wrote container"
    );
    Ok(container.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_two_paths_parse() {
        let parsed = Pcm2WavArgs::parse(args(&["in.pcm", "out.wav"])).unwrap();

        assert_eq!(parsed.input, PathBuf::from("in.pcm"));
        assert_eq!(parsed.output, PathBuf::from("out.wav"));
    }

    #[test]
    fn test_wrong_argument_count_is_a_usage_error() {
        for bad in [args(&[]), args(&["in.pcm"]), args(&["a", "b", "c"])] {
            assert!(matches!(Pcm2WavArgs::parse(bad), Err(AppError::Usage(_))));
        }
    }
}
