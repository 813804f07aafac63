use std::fs;

use mavwire_codec::{EncoderConfig, Session};
use mavwire_frame::RawFrame;
use serde_json::Value;

use crate::cmd::{Context, EncodeArgs};
use crate::exit::{encode_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_raw, render_encoded, EncodedFrame};

pub fn run(args: EncodeArgs, ctx: &Context) -> CliResult<i32> {
    let registry = ctx.registry()?;
    let mut config = ctx.session_config()?;
    apply_overrides(&mut config.encoder, &args);

    let commands = commands(&read_document(&args)?)?;
    let mut session = Session::new(registry, config);

    let mut raw = Vec::new();
    for (index, command) in commands.iter().enumerate() {
        let sequence = session.encoder_mut().sequence();
        let frame = session
            .encoder_mut()
            .encode_value(command)
            .map_err(|err| encode_error(&format!("command {index}"), err))?;

        if args.hex {
            let msg_id = RawFrame::new(frame.clone()).message_id().unwrap_or_default();
            let msg_name = session
                .registry()
                .lookup_by_id(msg_id)
                .map(|schema| schema.name())
                .unwrap_or_default();
            let shown = EncodedFrame {
                msg_id,
                msg_name,
                sequence,
                length: frame.len(),
                hex: hex::encode(&frame),
            };
            println!("{}", render_encoded(&shown, ctx.format));
        } else {
            raw.extend_from_slice(&frame);
        }
    }

    if !args.hex {
        print_raw(&raw).map_err(|err| io_error("failed writing frame", err))?;
    }
    Ok(SUCCESS)
}

fn apply_overrides(config: &mut EncoderConfig, args: &EncodeArgs) {
    if let Some(sysid) = args.sysid {
        config.source_system = sysid;
    }
    if let Some(compid) = args.compid {
        config.source_component = compid;
    }
    if args.truncate {
        config.truncate_payload = true;
    }
}

fn read_document(args: &EncodeArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "either --json or --file is required"))
}

/// A document is one command object or an array of them.
fn commands(document: &str) -> CliResult<Vec<Value>> {
    let value: Value = serde_json::from_str(document)
        .map_err(|err| CliError::new(DATA_INVALID, format!("command is not valid JSON: {err}")))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}
