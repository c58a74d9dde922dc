use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry name the `provided.al2023` runtime executes.
const BOOTSTRAP_ENTRY: &str = "bootstrap";
const LAMBDA_PACKAGE: &str = "inventory_lambda";
const DEFAULT_TARGET: &str = "x86_64-unknown-linux-gnu";

/// Inventory pipeline functions shipped by this workspace.
const FUNCTIONS: [InventoryFunction; 2] = [
    InventoryFunction {
        binary: "load_inventory",
        role: "CSV upload -> inventory table",
    },
    InventoryFunction {
        binary: "check_stock",
        role: "table stream -> stock-out alerts",
    },
];

struct InventoryFunction {
    binary: &'static str,
    role: &'static str,
}

impl InventoryFunction {
    fn archive_path(&self, dist_dir: &Path) -> PathBuf {
        dist_dir.join(format!("{}.zip", self.binary))
    }
}

type TaskResult = Result<(), String>;

#[derive(Parser)]
#[command(name = "xtask", about = "Build, package and check the inventory pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Run fmt, clippy and the workspace tests, optionally followed by packaging
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build both Lambda binaries and zip each one as a `bootstrap` artifact
    ServerlessPackage {
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,
        #[arg(value_enum, long, default_value_t = Profile::Release)]
        profile: Profile,
        #[arg(long, env = "LAMBDA_DIST_DIR", default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CiJob {
    Check,
    Package,
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Debug,
    Release,
}

impl Profile {
    fn output_dir(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

struct PackageRequest<'a> {
    target: &'a str,
    profile: Profile,
    dist_dir: &'a Path,
}

impl PackageRequest<'_> {
    fn run(&self) -> TaskResult {
        require_installed_target(self.target)?;

        let mut build = vec!["build", "-p", LAMBDA_PACKAGE, "--target", self.target];
        for function in &FUNCTIONS {
            build.extend(["--bin", function.binary]);
        }
        if let Profile::Release = self.profile {
            build.push("--release");
        }
        cargo("Build inventory functions", &build)?;

        fs::create_dir_all(self.dist_dir)
            .map_err(|error| format!("creating {}: {error}", self.dist_dir.display()))?;
        let build_dir = Path::new("target")
            .join(self.target)
            .join(self.profile.output_dir());

        for function in &FUNCTIONS {
            let archive = function.archive_path(self.dist_dir);
            write_bootstrap_zip(&build_dir.join(function.binary), &archive)?;
            eprintln!("packaged {} ({})", archive.display(), function.role);
        }
        Ok(())
    }
}

fn cargo(label: &str, args: &[&str]) -> TaskResult {
    eprintln!("\n--- {label}: cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("{label}: unable to start cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{label}: cargo exited with {status}"))
    }
}

/// Fails early with the `rustup` fix when the cross target is missing. A host
/// without `rustup` skips the check and lets cargo report the problem.
fn require_installed_target(target: &str) -> TaskResult {
    let Ok(output) = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    else {
        return Ok(());
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if installed.lines().any(|line| line.trim() == target) {
        Ok(())
    } else {
        Err(format!(
            "rust target `{target}` is not installed; run `rustup target add {target}`"
        ))
    }
}

fn write_bootstrap_zip(binary: &Path, archive: &Path) -> TaskResult {
    let executable = fs::read(binary)
        .map_err(|error| format!("reading lambda binary {}: {error}", binary.display()))?;
    let file = File::create(archive)
        .map_err(|error| format!("creating {}: {error}", archive.display()))?;

    let mut zip = ZipWriter::new(file);
    let entry = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file(BOOTSTRAP_ENTRY, entry)
        .and_then(|()| zip.write_all(&executable).map_err(Into::into))
        .and_then(|()| zip.finish().map(drop))
        .map_err(|error| format!("writing {}: {error}", archive.display()))
}

fn ci_check() -> TaskResult {
    cargo("Formatting", &["fmt", "--all", "--", "--check"])?;
    cargo(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )?;
    cargo("Tests", &["test", "--workspace"])
}

fn ci_package() -> TaskResult {
    PackageRequest {
        target: DEFAULT_TARGET,
        profile: Profile::Release,
        dist_dir: Path::new("dist"),
    }
    .run()
}

fn run(task: Task) -> TaskResult {
    match task {
        Task::Ci { job } => {
            if matches!(job, CiJob::Check | CiJob::All) {
                ci_check()?;
            }
            if matches!(job, CiJob::Package | CiJob::All) {
                ci_package()?;
            }
            Ok(())
        }
        Task::ServerlessPackage {
            target,
            profile,
            dist_dir,
        } => PackageRequest {
            target: &target,
            profile,
            dist_dir: &dist_dir,
        }
        .run(),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse().command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("xtask failed: {message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("xtask-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn archives_are_named_after_each_function() {
        let names: Vec<PathBuf> = FUNCTIONS
            .iter()
            .map(|function| function.archive_path(Path::new("dist")))
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("dist/load_inventory.zip"),
                PathBuf::from("dist/check_stock.zip"),
            ]
        );
    }

    #[test]
    fn zip_holds_executable_bootstrap_entry() {
        let dir = scratch_dir("bootstrap");
        let binary = dir.join("load_inventory");
        let archive = dir.join("load_inventory.zip");
        fs::write(&binary, b"\x7fELF-inventory").unwrap();

        write_bootstrap_zip(&binary, &archive).unwrap();

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_name(BOOTSTRAP_ENTRY).unwrap();
        assert_eq!(entry.unix_mode().map(|mode| mode & 0o777), Some(0o755));
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"\x7fELF-inventory");
        drop(entry);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_binary_names_the_path() {
        let dir = scratch_dir("missing");

        let error = write_bootstrap_zip(&dir.join("check_stock"), &dir.join("check_stock.zip"))
            .expect_err("absent binary should fail");

        assert!(error.contains("check_stock"));
        fs::remove_dir_all(dir).unwrap();
    }
}
