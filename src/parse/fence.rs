//! Removal of the single code fence chat clients wrap around submitted source.

const TRIPLE: &str = "```";
const SINGLE: &str = "`";

/// The part of the source left to lex once a fence has been stripped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Unfenced<'a> {
    pub text: &'a str,
    /// Byte offset of `text` within the original source.
    pub offset: usize,
}

/// An opening fence without a closing one, or the other way around.
/// Carries the byte offset of the unmatched delimiter.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct UnclosedFence(pub usize);

pub(crate) fn strip(source: &str) -> Result<Unfenced<'_>, UnclosedFence> {
    let leading = source.len() - source.trim_start().len();
    let trimmed = source.trim();

    let fence = if trimmed.starts_with(TRIPLE) {
        TRIPLE
    } else if trimmed.starts_with(SINGLE) {
        SINGLE
    } else if trimmed.ends_with(SINGLE) {
        return Err(UnclosedFence(leading + trimmed.len() - SINGLE.len()));
    } else {
        return Ok(Unfenced {
            text: source,
            offset: 0,
        });
    };

    if trimmed.len() < 2 * fence.len() || !trimmed.ends_with(fence) {
        return Err(UnclosedFence(leading));
    }

    Ok(Unfenced {
        text: &trimmed[fence.len()..trimmed.len() - fence.len()],
        offset: leading + fence.len(),
    })
}
