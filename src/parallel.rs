//! Parallel part parsing
//!
//! Uses Rayon to parse several independent buffers (for example the XML
//! parts of one package) at once. Every part gets its own parser, scratch
//! buffer, namespace context and handler; all parts intern into one
//! [`SharedNamespaceRegistry`], so namespace identities agree across parts.

use log::debug;
use rayon::prelude::*;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::ns::parser::{NsHandler, NsParser};
use crate::ns::registry::SharedNamespaceRegistry;

/// Parse every part on the Rayon pool with the namespace layer.
///
/// `make_handler` is called once per part with the part's index. Results
/// are returned in input order; a failing part does not affect the others.
pub fn parse_parts<P, H, F>(
    parts: &[P],
    registry: &SharedNamespaceRegistry,
    config: ParserConfig,
    make_handler: F,
) -> Vec<Result<H>>
where
    P: AsRef<[u8]> + Sync,
    H: for<'a> NsHandler<'a> + Send,
    F: Fn(usize) -> H + Sync,
{
    debug!("parsing {} parts in parallel", parts.len());
    parts
        .par_iter()
        .enumerate()
        .map(|(index, part)| {
            let mut handler = make_handler(index);
            let mut context = registry.create_context();
            NsParser::new(part.as_ref(), config, &mut context).parse(&mut handler)?;
            Ok(handler)
        })
        .collect()
}
