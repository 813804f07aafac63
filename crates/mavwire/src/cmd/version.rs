use crate::cmd::{Context, VersionArgs};
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs, ctx: &Context) -> CliResult<i32> {
    if !args.extended {
        println!("mavwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: mavwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("MAVWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("protocol: MAVLink v2 (unsigned)");

    // Still succeeds with an unreadable --dialect.
    match ctx.registry() {
        Ok(registry) => println!(
            "dialect: {} v{} ({} messages)",
            registry.dialect(),
            registry.version(),
            registry.len()
        ),
        Err(err) => println!("dialect: unavailable ({err})"),
    }

    Ok(SUCCESS)
}
