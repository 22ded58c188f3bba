//! CLI tool for single-file tar extraction.

mod commands;
mod exit_codes;
mod progress;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::{Path, PathBuf};

use tar_to_file::Transform;

use exit_codes::ExitCode;

/// Extract the single file of a tar archive
#[derive(Parser)]
#[command(name = "tar-to-file")]
#[command(author, version, about = "Extract the single file of a tar archive", long_about = None)]
pub struct Cli {
    /// Tar archive containing exactly one regular file
    #[arg(required_unless_present = "completions")]
    archive: Option<PathBuf>,

    /// Path of the file to create
    #[arg(required_unless_present = "completions")]
    destination: Option<PathBuf>,

    /// Decompression applied to the archive before reading it
    #[arg(
        long,
        short = 'd',
        value_enum,
        default_value = "auto",
        env = "TAR_TO_FILE_DECOMPRESS"
    )]
    decompress: Decompress,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_enum, exclusive = true)]
    completions: Option<Shell>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Decompress {
    /// Pick by file extension
    Auto,
    None,
    Gzip,
    Zstd,
    Xz,
    Bzip2,
}

impl Decompress {
    /// Resolves `Auto` from the archive's file extension
    fn resolve(self, archive: &Path) -> Self {
        if self != Self::Auto {
            return self;
        }
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if name.ends_with(".gz") || name.ends_with(".tgz") {
            Self::Gzip
        } else if name.ends_with(".zst") || name.ends_with(".tzst") {
            Self::Zstd
        } else if name.ends_with(".xz") || name.ends_with(".txz") {
            Self::Xz
        } else if name.ends_with(".bz2") || name.ends_with(".tbz2") || name.ends_with(".tbz") {
            Self::Bzip2
        } else {
            Self::None
        }
    }

    /// Builds the transform for this method
    pub fn transform(self, archive: &Path) -> Result<Option<Transform>, String> {
        let method = self.resolve(archive);
        match method {
            Self::Auto | Self::None => Ok(None),
            #[cfg(feature = "gzip")]
            Self::Gzip => Ok(Some(Transform::gzip())),
            #[cfg(feature = "zstd")]
            Self::Zstd => Ok(Some(Transform::zstd())),
            #[cfg(feature = "xz")]
            Self::Xz => Ok(Some(Transform::xz())),
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => Ok(Some(Transform::bzip2())),
            #[allow(unreachable_patterns)]
            other => Err(format!(
                "this build does not support {:?} decompression",
                other
            )),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        std::process::exit(ExitCode::Success.code());
    }

    let (Some(archive), Some(destination)) = (cli.archive, cli.destination) else {
        eprintln!("Error: an archive and a destination are required");
        std::process::exit(ExitCode::BadArgs.code());
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            std::process::exit(ExitCode::FatalError.code());
        }
    };

    let exit_code = runtime.block_on(commands::extract(&commands::ExtractConfig {
        archive_path: &archive,
        destination: &destination,
        decompress: cli.decompress,
        quiet: cli.quiet,
    }));

    std::process::exit(exit_code.code());
}
