use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pagefile::{PAGE_SIZE, PageFile, PageFileResult, PageId};

#[derive(Parser)]
#[command(name = "pagefile", about = "Inspect and manipulate page files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new page file with a single zero-filled page
    Create { path: PathBuf },
    /// Remove a page file from disk
    Destroy { path: PathBuf },
    /// Print page size, page count and byte length
    Info { path: PathBuf },
    /// Append empty pages at the end of the file
    Append {
        path: PathBuf,
        /// Number of pages to append
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Grow the file to at least the given number of pages
    Ensure { path: PathBuf, min_pages: usize },
    /// Hex dump one page to stdout
    Dump { path: PathBuf, page_id: PageId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> PageFileResult<()> {
    match command {
        Command::Create { path } => {
            PageFile::create(&path)?;
            println!("created {} (1 page)", path.display());
        }
        Command::Destroy { path } => {
            PageFile::destroy(&path)?;
            println!("destroyed {}", path.display());
        }
        Command::Info { path } => {
            let pf = PageFile::open(&path)?;
            let byte_len = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            println!("path:        {}", path.display());
            println!("page size:   {}", PAGE_SIZE);
            println!("total pages: {}", pf.total_pages());
            println!("byte length: {}", byte_len);
            let tail = byte_len % PAGE_SIZE as u64;
            if tail != 0 {
                println!("warning: {} trailing bytes beyond the last full page", tail);
            }
        }
        Command::Append { path, count } => {
            let mut pf = PageFile::open(&path)?;
            for _ in 0..count {
                pf.append_empty_block()?;
            }
            println!("appended {} page(s), total {}", count, pf.total_pages());
        }
        Command::Ensure { path, min_pages } => {
            let mut pf = PageFile::open(&path)?;
            pf.ensure_capacity(min_pages)?;
            println!("total pages: {}", pf.total_pages());
        }
        Command::Dump { path, page_id } => {
            let mut pf = PageFile::open(&path)?;
            let mut buf = [0u8; PAGE_SIZE];
            pf.read_block(page_id, &mut buf)?;
            dump_page(page_id, &buf);
        }
    }

    Ok(())
}

fn dump_page(page_id: PageId, buf: &[u8; PAGE_SIZE]) {
    for (i, row) in buf.chunks(16).enumerate() {
        let offset = page_id * PAGE_SIZE + i * 16;
        let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = row
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("{:08x}  {}  |{}|", offset, hex.join(" "), ascii);
    }
}
