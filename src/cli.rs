use clap::{value_parser, crate_version, Arg, ArgAction, Command, ValueHint};

const FIND_LONG_HELP: &str = "Gather every source below the workspace directory and print the symbols
whose name starts with PREFIX, one per line as `name<TAB>path:line:column`.
Local labels are found by their full name, e.g. `Main.loop` for `.loop` under `Main`.
With `--from`, the scope can be narrowed to the files that FILE includes,
or to the files in FILE's include directory.";
const CONFIG_LONG_HELP: &str = "JSON settings string, e.g. `{\"caseSensitive\": true}`.
Keys: sourceExtensions, maxFiles, caseSensitive, includeScope";

fn file_arg(help: &'static str, req: bool) -> Arg {
    Arg::new("file").short('f').long("file").value_name("PATH").required(req).help(help)
        .value_hint(ValueHint::FilePath)
}

fn indent_arg() -> Arg {
    Arg::new("indent").long("indent").help("JSON indentation, omit to minify")
        .value_name("SPACES")
        .value_parser(value_parser!(u16).range(0..16))
        .required(false)
}

pub fn build_cli() -> Command {
    let long_help = "m68kit is always invoked with exactly one of several subcommands.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
fields of each line:   `m68kit parse -f main.s`
symbols of a file:     `m68kit symbols -f main.s --indent 2`
find across files:     `m68kit find -p Wait -k label -w ./src`
local label:           `m68kit find -p Main.lo -k label -w ./src`
include scope:         `m68kit find -p COLOR -k variable -w ./src --from ./src/main.s --scope includes`";

    let kinds = ["label", "variable", "macro"];
    let scopes = ["workspace", "includes", "includeDir"];

    let mut main_cmd = Command::new("m68kit")
        .about("Analyzes Motorola 68000 assembly sources.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("parse")
            .arg(file_arg("path to source file", true))
            .about("print the fields of every line as JSON lines"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("symbols")
            .arg(file_arg("path to source file", true))
            .arg(indent_arg())
            .about("print the symbols of one file as JSON"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("find")
            .arg(
                Arg::new("prefix")
                    .short('p')
                    .long("prefix")
                    .value_name("PREFIX")
                    .help("start of the symbol name")
                    .required(true),
            )
            .arg(
                Arg::new("kind")
                    .short('k')
                    .long("kind")
                    .value_name("KIND")
                    .help("kind of symbol")
                    .value_parser(kinds)
                    .default_value("label"),
            )
            .arg(
                Arg::new("workspace")
                    .short('w')
                    .long("workspace")
                    .value_name("DIR")
                    .help("workspace directory")
                    .value_hint(ValueHint::DirPath)
                    .required(true),
            )
            .arg(
                Arg::new("from")
                    .long("from")
                    .value_name("FILE")
                    .help("file the search is made from")
                    .value_hint(ValueHint::FilePath)
                    .required(false),
            )
            .arg(
                Arg::new("scope")
                    .long("scope")
                    .value_name("SCOPE")
                    .help("which files to search, needs `--from`")
                    .value_parser(scopes)
                    .required(false),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("JSON")
                    .help("settings as a JSON string")
                    .long_help(CONFIG_LONG_HELP)
                    .required(false),
            )
            .arg(
                Arg::new("case")
                    .long("case-sensitive")
                    .help("match case exactly")
                    .action(ArgAction::SetTrue),
            )
            .about("find symbols by prefix across a workspace")
            .after_long_help(FIND_LONG_HELP),
    );
    main_cmd
}
