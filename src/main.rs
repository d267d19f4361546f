//! # Command Line Interface
//!
//! Each subcommand reads sources from the host file system and writes to stdout.
//! JSON output is produced with `serde_json`, symbol searches as tab separated lines.

use env_logger;
use log::error;
use serde::Serialize;
use serde_json::json;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use colored::Colorize;
use lsp_types as lsp;
use m68kit::lang::{self,Document};
use m68kit::lang::files::LocalFiles;
use m68kit::lang::m68k::{parser,settings,symbol_file,Symbol};
use m68kit::lang::m68k::query::Project;
use m68kit::lang::m68k::resolver::Resolved;

mod cli;

const RCH: &str = "unreachable was reached";

fn read_source(path: &str) -> Result<Document,Box<dyn std::error::Error>> {
    match Document::from_file_path(Path::new(path)) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            error!("could not read {}: {}",path,e);
            Err(Box::new(e))
        }
    }
}

fn absolute_url(path: &str, dir: bool) -> Result<lsp::Url,Box<dyn std::error::Error>> {
    let full = match std::fs::canonicalize(path) {
        Ok(p) => p,
        Err(e) => {
            error!("could not resolve {}: {}",path,e);
            return Err(Box::new(e));
        }
    };
    let ans = match dir {
        true => lsp::Url::from_directory_path(full),
        false => lsp::Url::from_file_path(full)
    };
    match ans {
        Ok(uri) => Ok(uri),
        Err(_) => Err(Box::new(lang::Error::BadUrl))
    }
}

fn field(text: &str, rng: &lsp::Range) -> serde_json::Value {
    json!({
        "text": text,
        "start": rng.start.character,
        "end": rng.end.character
    })
}

fn write_json(obj: &serde_json::Value, indent: Option<&u16>) -> Result<(),Box<dyn std::error::Error>> {
    match indent {
        Some(spaces) => {
            let ind = " ".repeat(*spaces as usize);
            let mut buf = Vec::new();
            let fmt = serde_json::ser::PrettyFormatter::with_indent(ind.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut buf,fmt);
            obj.serialize(&mut ser)?;
            println!("{}",String::from_utf8(buf)?);
        },
        None => println!("{}",obj.to_string())
    }
    Ok(())
}

fn symbols(syms: &[Symbol]) -> Result<serde_json::Value,serde_json::Error> {
    serde_json::to_value(syms)
}

/// Location as `path:line:column`, 1-based
fn location(res: &Resolved) -> String {
    let start = res.symbol.range().start;
    let path = match res.file.uri().to_file_path() {
        Ok(p) => p.display().to_string(),
        Err(_) => res.file.uri().to_string()
    };
    format!("{}:{}:{}",path,start.line + 1,start.character + 1)
}

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    let matches = cli::build_cli().get_matches();

    // Fields of each line

    if let Some(cmd) = matches.subcommand_matches("parse") {
        let doc = read_source(cmd.get_one::<String>("file").expect(RCH))?;
        for (row,txt) in doc.text.lines().enumerate() {
            let line = parser::parse(txt,row as u32);
            let kind = match line.kind() {
                parser::LineKind::Empty => "empty",
                parser::LineKind::Comment => "comment",
                parser::LineKind::Assignment => "assignment",
                parser::LineKind::Statement => "statement"
            };
            let obj = json!({
                "row": row,
                "kind": kind,
                "label": field(line.label(),&line.label_range()),
                "instruction": field(line.instruction(),&line.instruction_range()),
                "size": field(line.size(),&line.size_range()),
                "data": field(line.data(),&line.data_range()),
                "comment": field(line.comment(),&line.comment_range()),
                "variable": field(line.variable(),&line.variable_range()),
                "value": field(line.value(),&line.value_range())
            });
            println!("{}",obj.to_string());
        }
        return Ok(());
    }

    // Symbols of one file

    if let Some(cmd) = matches.subcommand_matches("symbols") {
        let doc = read_source(cmd.get_one::<String>("file").expect(RCH))?;
        let file = symbol_file::extract(&doc.uri,&doc.text);
        let obj = json!({
            "uri": doc.uri.as_str(),
            "labels": symbols(file.labels())?,
            "variables": symbols(file.variables())?,
            "macros": symbols(file.macros())?,
            "subroutines": file.subroutine_names(),
            "dataOwners": symbols(file.data_definition_owners())?,
            "includeDir": file.include_dir(),
            "includes": symbols(file.included_files())?
        });
        return write_json(&obj,cmd.get_one::<u16>("indent"));
    }

    // Find symbols across a workspace

    if let Some(cmd) = matches.subcommand_matches("find") {
        let prefix = cmd.get_one::<String>("prefix").expect(RCH);
        let mut config = match cmd.get_one::<String>("config") {
            Some(json) => settings::parse(json)?,
            None => settings::Settings::new()
        };
        if cmd.get_flag("case") {
            config.case_sensitive = true;
        }
        config.include_scope = match cmd.get_one::<String>("scope").map(|s| s.as_str()) {
            Some("includes") => settings::IncludeScope::Includes,
            Some("includeDir") => settings::IncludeScope::IncludeDir,
            Some(_) => settings::IncludeScope::Workspace,
            None => config.include_scope
        };
        let ws = absolute_url(cmd.get_one::<String>("workspace").expect(RCH),true)?;
        let from = match cmd.get_one::<String>("from") {
            Some(path) => Some(absolute_url(path,false)?),
            None => None
        };
        let project = Project::new(Arc::new(LocalFiles::new()),config);
        if let Err(e) = project.gather(&[ws]) {
            error!("could not gather workspace: {}",e);
            return Err(Box::new(e));
        }
        let results = match cmd.get_one::<String>("kind").map(|s| s.as_str()) {
            Some("variable") => project.find_variable_starting_with(prefix,from.as_ref()),
            Some("macro") => project.find_macro_starting_with(prefix,from.as_ref()),
            _ => project.find_label_starting_with(prefix,from.as_ref())
        };
        if results.len() == 0 {
            eprintln!("no matches");
        }
        for res in results {
            println!("{}\t{}",res.name.bold(),location(&res));
        }
        return Ok(());
    }

    error!("No subcommand was found, try `m68kit --help`");
    Err(Box::new(lang::Error::Syntax))
}
