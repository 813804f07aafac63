use crate::cmd::{Context, MessagesArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{render_catalog, render_layout};

pub fn run(args: MessagesArgs, ctx: &Context) -> CliResult<i32> {
    let registry = ctx.registry()?;

    match args.name {
        Some(name) => {
            let schema = registry.lookup_by_name(&name).ok_or_else(|| {
                CliError::new(
                    DATA_INVALID,
                    format!("unknown message {name} in dialect {}", registry.dialect()),
                )
            })?;
            println!("{}", render_layout(schema, ctx.format));
        }
        None => println!("{}", render_catalog(&registry, ctx.format)),
    }

    Ok(SUCCESS)
}
