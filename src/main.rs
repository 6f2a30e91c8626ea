//! Punto de entrada ("driver").
//!
//! Este módulo lee el programa fuente, invoca a la pipeline y escribe
//! el resultado, ya sea código de tres direcciones o C.

use anyhow::{self, bail, Context};
use clap::{crate_version, Arg, Command};
use slc::{
    codegen::{self, EmitOptions},
    error::Diagnostics,
    ir::Program,
};

use std::{
    fs::{self, File},
    io::{self, BufWriter, Cursor, Read, Write},
    process,
};

use tracing::Level;

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("slc")
        .version(crate_version!())
        .about("Compiles a minimal imperative language to C")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .required(true)
                .help("Source file ('-' for stdin)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .default_value("output.c")
                .help("Output file ('-' for stdout)"),
        )
        .arg(
            Arg::new("tac")
                .short('S')
                .long("tac")
                .help("Write three-address code instead of C"),
        )
        .arg(
            Arg::new("annotate")
                .short('a')
                .long("annotate")
                .help("Precede each C statement with its three-address code"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Increase log verbosity, may be repeated"),
        )
        .get_matches();

    let level = match args.occurrences_of("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    // Se extraen argumentos necesarios
    let input = args.value_of("input").unwrap_or("-");
    let output = args.value_of("output").unwrap_or("output.c");
    let tac = args.is_present("tac");

    let mut options = EmitOptions::empty();
    if args.is_present("annotate") {
        if tac {
            bail!("--annotate only applies to C output");
        }

        options |= EmitOptions::ANNOTATE;
    }

    let (name, source) = read_source(input)?;
    let program = match slc::compile(Cursor::new(source.clone())) {
        Ok(program) => program,
        Err(error) => {
            eprint!("{}", Diagnostics::new(&error, &name, &source));
            process::exit(1);
        }
    };

    match output {
        "-" => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();

            write_program(&program, tac, options, &mut stdout)
                .context("Failed to write to stdout")?;
        }

        path => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            let mut file = BufWriter::new(file);
            write_program(&program, tac, options, &mut file)
                .and_then(|()| file.flush())
                .with_context(|| format!("Failed to write to file: {}", path))?;
        }
    }

    Ok(())
}

fn read_source(input: &str) -> anyhow::Result<(String, String)> {
    match input {
        "-" => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read from stdin")?;

            Ok((String::from("<stdin>"), source))
        }

        path => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file: {}", path))?;

            Ok((path.to_owned(), source))
        }
    }
}

fn write_program<W: Write>(
    program: &Program,
    tac: bool,
    options: EmitOptions,
    output: &mut W,
) -> io::Result<()> {
    if tac {
        write!(output, "{}", program)
    } else {
        codegen::emit(program, options, output)
    }
}
