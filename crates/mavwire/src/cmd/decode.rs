use std::fs::File;
use std::io::{self, Read};

use mavwire_codec::{
    DecodedMessage, DiagnosticRecord, ErrorReporter, ErrorSink, MessageSink, PumpStats, Session,
    SinkError,
};

use crate::cmd::{Context, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{render_diagnostic, render_message, OutputFormat};

/// Prints decoded messages and diagnostic records to stdout.
struct Printer {
    format: OutputFormat,
}

impl MessageSink for Printer {
    fn deliver(&mut self, message: DecodedMessage) -> Result<(), SinkError> {
        println!("{}", render_message(&message, self.format));
        Ok(())
    }
}

impl ErrorSink for Printer {
    fn push(&mut self, channel: &str, record: &DiagnosticRecord) -> Result<(), SinkError> {
        println!("{}", render_diagnostic(channel, record, self.format));
        Ok(())
    }
}

pub fn run(args: DecodeArgs, ctx: &Context) -> CliResult<i32> {
    let registry = ctx.registry()?;
    let mut config = ctx.session_config()?;
    if args.target.is_some() {
        config.decoder.target_system = args.target;
    }
    let channel = config.error_channel.clone();

    let mut session = Session::new(registry, config);
    let mut messages = Printer { format: ctx.format };
    let mut reporter = ErrorReporter::with_channel(Printer { format: ctx.format }, channel);
    let chunk = args.chunk as usize;

    let mut input = open_input(&args)?;
    let mut totals = PumpStats::default();
    let mut tally = |stats: PumpStats| {
        totals.delivered += stats.delivered;
        totals.filtered += stats.filtered;
        totals.reported += stats.reported;
    };

    if args.hex {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|err| io_error("failed reading input", err))?;
        let bytes = parse_hex(&text)?;
        for piece in bytes.chunks(chunk) {
            tally(session.pump(piece, &mut messages, &mut reporter));
        }
    } else {
        let mut buf = vec![0u8; chunk];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(io_error("failed reading input", err)),
            };
            tally(session.pump(&buf[..n], &mut messages, &mut reporter));
        }
    }

    tracing::info!(
        delivered = totals.delivered,
        filtered = totals.filtered,
        reported = totals.reported,
        skipped_bytes = session.skipped_bytes(),
        trailing_bytes = session.buffered(),
        "decode finished"
    );
    Ok(SUCCESS)
}

fn open_input(args: &DecodeArgs) -> CliResult<Box<dyn Read>> {
    match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                io_error(&format!("failed opening {}", path.display()), err)
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}
