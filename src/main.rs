// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Marginalia CLI entrypoint.
//!
//! By default this loads `*.page.json` documents from a folder and runs the
//! interactive viewer. `--check` runs the scan pass only and reports
//! configuration errors; `--demo` uses a built-in page instead of a folder.

use std::error::Error;

use marginalia::scan::scan_page;
use marginalia::store::PageFolder;
use marginalia::tabs::TabStrip;
use marginalia::{model::PageDoc, tui};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<page-dir>] [--check]\n  {program} --demo [--check]\n\nLoads <page-dir>/*.page.json (default: the current working directory) and\nruns the interactive annotation viewer.\n\n--check scans the pages and reports configuration errors without starting\nthe viewer; the exit code is 1 if any page has errors.\n--demo uses a built-in demo page and cannot be combined with <page-dir>."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    check: bool,
    demo: bool,
    page_dir: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--check" => {
                if options.check {
                    return Err(());
                }
                options.check = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.page_dir.is_some() {
                    return Err(());
                }
                options.page_dir = Some(arg);
            }
        }
    }

    if options.demo && options.page_dir.is_some() {
        return Err(());
    }

    Ok(options)
}

/// Scan-only mode: report every configuration error, count them.
fn check_pages(pages: &[(String, PageDoc)]) -> usize {
    let mut error_count = 0;
    for (name, doc) in pages {
        let report = scan_page(doc);
        for err in report.errors() {
            eprintln!("marginalia: {name}: {err}");
            error_count += 1;
        }
        let mut doc = doc.clone();
        let (_, strip_errors) = TabStrip::build_all(&mut doc);
        for err in &strip_errors {
            eprintln!("marginalia: {name}: {err}");
            error_count += 1;
        }
    }
    error_count
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "marginalia".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let pages: Vec<(String, PageDoc)> = if options.demo {
            vec![("demo".to_owned(), tui::demo_page())]
        } else {
            let dir = options.page_dir.unwrap_or_else(|| ".".to_owned());
            let outcome = PageFolder::new(dir).load_pages()?;
            for err in &outcome.errors {
                eprintln!("marginalia: {err}");
            }
            outcome
                .pages
                .into_iter()
                .map(|page| {
                    let name = page.name().to_owned();
                    (name, page.into_doc())
                })
                .collect()
        };

        if pages.is_empty() {
            return Err("no pages found".into());
        }

        if options.check {
            let error_count = check_pages(&pages);
            if error_count > 0 {
                eprintln!("marginalia: {error_count} configuration errors");
                std::process::exit(1);
            }
            return Ok(());
        }

        tui::run_with_pages(pages)?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("marginalia: {err}");
        std::process::exit(1);
    }
}
