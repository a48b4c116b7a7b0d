//! Copy command implementation.

use anyhow::Result;

use bytepipe_core::copy::copy;
use bytepipe_core::stream::Endpoint;

use super::CopyArgs;

/// Run the default copy operation.
pub fn run(args: &CopyArgs) -> Result<()> {
    let input = Endpoint::from_arg(args.input.as_deref());
    let output = Endpoint::from_arg(args.output.as_deref());

    copy(&input, &output, |event| tracing::info!("{event}")).map_err(|e| {
        let context = match e.transferred() {
            Some(written) => format!(
                "Copy of {} to {} stopped with {} bytes in the output",
                input, output, written
            ),
            None => format!("Failed to copy {} to {}", input, output),
        };
        anyhow::Error::new(e).context(context)
    })?;

    Ok(())
}
