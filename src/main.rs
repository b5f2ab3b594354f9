use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;

mod logging;
mod merge_dirs;
mod utils;

use logging::Verbosity;
use merge_dirs::{MergeOptions, SkipPolicy};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "dirmerge",
    about = "Merge files to one directory and remove duplicates."
)]
pub struct CliOptions {
    /// Directories with files to be merged.
    #[structopt(parse(from_os_str), raw(required = "true"))]
    directories: Vec<PathBuf>,

    /// Output directory.
    #[structopt(long = "out", parse(from_os_str), default_value = "merged")]
    out: PathBuf,

    /// Remove directories after merge.
    #[structopt(long = "rm")]
    rm: bool,

    /// Print what would be copied and removed without touching anything.
    #[structopt(short = "d", long = "dry")]
    dry: bool,

    /// Compare files already in the output directory with their sources and
    /// warn about mismatches. They are never overwritten.
    #[structopt(long = "verify-existing")]
    verify_existing: bool,

    /// Increase verbosity.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = CliOptions::from_args();
    let verbosity = Verbosity(cli.verbose);

    let options = MergeOptions {
        directories: cli.directories,
        out_dir: cli.out,
        remove_inputs: cli.rm,
        dry_run: cli.dry,
        skip_policy: if cli.verify_existing {
            SkipPolicy::Content
        } else {
            SkipPolicy::Name
        },
    };

    tracing::subscriber::with_default(logging::subscriber(verbosity), || {
        let stdout = stdout();
        let mut out = stdout.lock();
        match merge_dirs::merge_dirs(&options, &mut out) {
            Ok(report) => {
                tracing::info!(
                    copied = report.copied_files,
                    copied_bytes = report.copied_bytes,
                    skipped = report.skipped_existing,
                    stale = report.stale_existing,
                    removed = report.removed_dirs,
                    "Merge finished: {}",
                    report.mapping
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Merge failed");
                Err(e)
            }
        }
    })
}
