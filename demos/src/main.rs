// SPDX-License-Identifier: MIT

//! Reads a download config of the form
//! `{"<name>": {"url": "...", "filename": "..."}, ...}` and prints the
//! yt-dlp command for every entry. Spawning the downloader is left to
//! the caller (pipe the output into a shell).

use std::env;
use std::fs::File;
use std::io::Read;

use flatjson::{find_path, load_pairs_auto, tokenize_auto, unescape};

fn main() {
    let args: Vec<_> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} config.json", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];

    let mut text = Vec::new();
    let mut f = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Unable to open file '{}': {}", path, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = f.read_to_end(&mut text) {
        eprintln!("Error: Unable to read file '{}': {}", path, e);
        std::process::exit(1);
    }

    let tokens = match tokenize_auto(&text) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Error: cannot parse '{}': {}", path, e);
            std::process::exit(1);
        }
    };
    let pairs = match load_pairs_auto(&text, &tokens) {
        Ok(pairs) => pairs,
        Err(e) => {
            eprintln!("Error: cannot index '{}': {}", path, e);
            std::process::exit(1);
        }
    };

    for entry in pairs[0].children(&pairs) {
        let name = entry.key.bytes(&text);
        let found = find_path(&pairs, entry, &text, &[b"url".as_slice()])
            .zip(find_path(&pairs, entry, &text, &[b"filename".as_slice()]));
        let (url, filename) = match found {
            Some(found) => found,
            None => {
                eprintln!(
                    "Error: entry '{}' is missing url or filename",
                    String::from_utf8_lossy(name)
                );
                std::process::exit(1);
            }
        };
        let (url, filename) = match (
            unescape(url.value.bytes(&text)),
            unescape(filename.value.bytes(&text)),
        ) {
            (Ok(url), Ok(filename)) => (url, filename),
            _ => {
                eprintln!(
                    "Error: entry '{}' holds a malformed string",
                    String::from_utf8_lossy(name)
                );
                std::process::exit(1);
            }
        };
        println!(
            "yt-dlp {} -o {}.mp4 -f \"bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best\"",
            url, filename
        );
    }
}
