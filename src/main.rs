use std::{env, fs::read_to_string, path::PathBuf, process::ExitCode, rc::Rc, time::Instant};

use sora_sema::{
    display_error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, TypeCheckerOptions},
    types::{context::AstContext, printer::TypePrintOptions},
};

const USAGE: &str = "usage: sora-sema <file> [--dump-scopes] [--debug-types]";

struct Args {
    path: PathBuf,
    dump_scopes: bool,
    debug_types: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut path = None;
    let mut dump_scopes = false;
    let mut debug_types = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dump-scopes" => dump_scopes = true,
            "--debug-types" => debug_types = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag `{}`", flag)),
            _ if path.is_some() => return Err(String::from("more than one input file given")),
            _ => path = Some(PathBuf::from(arg)),
        }
    }

    match path {
        Some(path) => Ok(Args {
            path,
            dump_scopes,
            debug_types,
        }),
        None => Err(String::from("no input file given")),
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let file_name = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.path.to_string_lossy().into_owned());

    let file_contents = match read_to_string(&args.path) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("failed to read {}: {}", args.path.display(), error);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let tokens = match tokenize(file_contents, Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => {
            display_error(&error, args.path.clone());
            return ExitCode::FAILURE;
        }
    };
    println!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let (_, parsed) = parse(tokens, Rc::new(file_name));
    let file = match parsed {
        Ok(file) => file,
        Err(error) => {
            display_error(&error, args.path.clone());
            return ExitCode::FAILURE;
        }
    };
    println!("Parsed in {:?}", parse_start.elapsed());

    let ctx = AstContext::new();
    let type_check_start = Instant::now();
    let type_checker = type_check(&ctx, &file, &TypeCheckerOptions::default());
    println!("Type checked in {:?}", type_check_start.elapsed());

    for error in &type_checker.diagnostics {
        display_error(error, args.path.clone());
    }

    let print_options = if args.debug_types {
        TypePrintOptions::for_debug()
    } else {
        TypePrintOptions {
            allow_error_types: true,
            ..TypePrintOptions::for_diagnostics()
        }
    };
    for member in &file.members {
        let decl = file.ast.decl(*member);
        println!(
            "func {}: {}",
            decl.identifier().unwrap_or("_"),
            ctx.print_type(decl.ty(), &print_options)
        );
    }

    if args.dump_scopes {
        file.full_expand_scopes();
        print!("{}", file.dump_scopes());
    }

    if type_checker.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
