mod error;
mod writer;

// =====================================
// Public API of pulseq-writer
// =====================================

pub mod input;
pub mod value;

pub use error::*;
pub use value::{BlockSeq, Definition, Definitions};
pub use writer::{
    EventKind, GAMMA_H1, RenderedSeq, Version, Warning, WriteOptions, WriteReport, approx,
    render_seq, verify_signature, write_seq,
};

/// Load a sequence from `input` and write it as `.seq` file to `output`.
///
/// `input` is a MessagePack encoded [`BlockSeq`], optionally zstd compressed
/// (see [`input::load_seq`]). Warnings are logged and returned in the report,
/// they never stop the file from being written.
///
/// # Examples
/// ```no_run
/// # use pulseq_writer::{convert, WriteOptions};
/// let report = convert("gre.msgpack.zst", "gre.seq", &WriteOptions::default())?;
/// println!("signed with {}", report.hash);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn convert(
    input: impl AsRef<std::path::Path>,
    output: impl AsRef<std::path::Path>,
    opts: &WriteOptions,
) -> Result<WriteReport, ConvertError> {
    let seq = input::load_seq(input)?;
    Ok(write_seq(&seq, output, opts)?)
}
