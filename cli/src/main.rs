//! Interactive shell over a FAT16/32 disk image.
//!
//! A thin consumer of `fatfs-rs`: it owns the "current directory" handle
//! (the only mutable state outside the core, per the core's design) and
//! translates `ls`/`cd`/`cat`/`cp`/`h`/`q` into calls against
//! `fatfs_rs::FileSystem`.

use std::fs;
use std::io::{self, Write};

use clap::{Arg, Command};
use fatfs_rs::{AssembledEntry, DirHandle, FileSystem, Image};

fn main() {
    env_logger::init();

    let matches = Command::new("fatfs-cli")
        .arg(
            Arg::new("image")
                .short('i')
                .long("image")
                .required(true)
                .help("Path to a FAT16/32 disk image"),
        )
        .get_matches();

    let image_path = matches.get_one::<String>("image").unwrap();

    let bytes = match fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("failed to read {image_path}: {e}");
            std::process::exit(1);
        }
    };

    let fs = match FileSystem::open(Image::whole(bytes)) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("failed to open volume: {e}");
            std::process::exit(1);
        }
    };

    run_shell(&fs);
}

fn run_shell(fs: &FileSystem) {
    let mut cwd = fs.root();
    let mut cwd_path = String::from("/");

    loop {
        print!("{cwd_path} > ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut parts = line.trim().split_whitespace();
        let Some(cmd) = parts.next() else { continue };

        match cmd {
            "h" | "help" => print_help(),
            "q" => break,
            "ls" => match fs.read_directory(cwd) {
                Ok(entries) => print_listing(&entries),
                Err(e) => println!("ls: {e}"),
            },
            "cd" => {
                let Some(target) = parts.next() else {
                    println!("cd: missing argument");
                    continue;
                };
                match change_directory(fs, cwd, target) {
                    Ok((handle, path)) => {
                        cwd = handle;
                        cwd_path = path;
                    }
                    Err(e) => println!("cd: {e}"),
                }
            }
            "cat" => {
                let Some(target) = parts.next() else {
                    println!("cat: missing argument");
                    continue;
                };
                match read_path(fs, cwd, target) {
                    Ok(entry) => match fs.read_file(&entry) {
                        Ok(bytes) => {
                            io::stdout().write_all(&bytes).ok();
                        }
                        Err(e) => println!("cat: {e}"),
                    },
                    Err(e) => println!("cat: {e}"),
                }
            }
            "cp" => {
                let (Some(src), Some(dst)) = (parts.next(), parts.next()) else {
                    println!("cp: usage: cp <src> <dst>");
                    continue;
                };
                match read_path(fs, cwd, src) {
                    Ok(entry) => match fs.read_file(&entry) {
                        Ok(bytes) => {
                            if let Err(e) = fs::write(dst, &bytes) {
                                println!("cp: {e}");
                            }
                        }
                        Err(e) => println!("cp: {e}"),
                    },
                    Err(e) => println!("cp: {e}"),
                }
            }
            other => println!("unknown command {other:?}; try 'h' for help"),
        }
    }
}

fn change_directory(
    fs: &FileSystem,
    cwd: DirHandle,
    target: &str,
) -> Result<(DirHandle, String), fatfs_rs::Error> {
    if target == "/" {
        return Ok((fs.root(), "/".to_string()));
    }
    let components = FileSystem::split_path(target);
    let entry = fs.find(&components, cwd)?;
    let handle = fs.open_directory(&entry)?;
    Ok((handle, format!("/{}", components.join("/"))))
}

fn read_path(fs: &FileSystem, cwd: DirHandle, target: &str) -> Result<AssembledEntry, fatfs_rs::Error> {
    let components = FileSystem::split_path(target);
    fs.find(&components, cwd)
}

fn print_listing(entries: &[AssembledEntry]) {
    for entry in entries {
        let kind = if entry.is_directory() {
            "d"
        } else if entry.is_volume_label() {
            "v"
        } else {
            "-"
        };
        println!("{kind} {:>10} {}", entry.size, entry.name);
    }
}

fn print_help() {
    println!("h|help            show this message");
    println!("ls                 list the current directory");
    println!("cd <path>          change the current directory");
    println!("cat <path>         print a file's contents");
    println!("cp <src> <dst>     copy a file out of the image to <dst> on the host");
    println!("q                  quit");
}
