use std::io::Write;

use colored::Colorize;

use crate::cli::{open_manager, wprintln};
use crate::engine::bootstrap;
use crate::RowdbError;

pub struct InitOptions {
    pub config: String,
}

pub fn execute(opts: &InitOptions, writer: &mut dyn Write) -> Result<(), RowdbError> {
    let (config, mut buf) = open_manager(&opts.config)?;

    let fresh = bootstrap::initdb(&mut buf)?;
    buf.flush_all()?;

    if fresh {
        wprintln!(
            writer,
            "{} initialized database at {} (page size {}, {} buffer frames)",
            "ok:".green().bold(),
            config.data_file.display(),
            config.page_size,
            config.bufpool_size
        )?;
    } else {
        wprintln!(
            writer,
            "{} database at {} is already initialized",
            "ok:".green().bold(),
            config.data_file.display()
        )?;
    }
    Ok(())
}
