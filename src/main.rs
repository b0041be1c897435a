use anyhow::Result;

use wallet_factory::commands;

fn main() -> Result<()> {
    commands::dispatch(std::env::args_os())
}
