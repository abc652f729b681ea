//! Network export: stream the similarity graph as `.rcg` text.
//!
//! ```text
//! /Graph weighted:1 validated:1
//! /Nodes 3
//! /Edges
//! 1> 2:0.2
//! 2> 3:0.6
//! 3>
//! ```
//!
//! One line per source instance lists the links it owns; instances without
//! links still get their `<id>>` line so the engine sees every node. Ids are
//! printed unsigned, so filtered (negative) ids wrap around.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::{InstanceId, Link};
use crate::source::SimilaritySource;
use crate::Result;
use super::{build_links, LinkSink, NetOptions};

/// [`LinkSink`] writing the network text format.
pub struct NetWriter<W: Write> {
    out: W,
    line_open: bool,
}

impl<W: Write> NetWriter<W> {
    /// Write the header for `nodes` instances.
    pub fn new(mut out: W, nodes: usize, cuts_links: bool) -> Result<Self> {
        writeln!(out, "/Graph weighted:1 validated:1")?;
        writeln!(out, "/Nodes {nodes}")?;
        writeln!(out, "/Edges")?;
        if cuts_links {
            writeln!(out, "# Note: duplicated edges may exist and should be omitted")?;
        }
        Ok(Self { out, line_open: false })
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn open_line(&mut self, source: InstanceId) -> Result<()> {
        if !self.line_open {
            write!(self.out, "{}>", source.as_unsigned())?;
            self.line_open = true;
        }
        Ok(())
    }
}

impl<W: Write> LinkSink for NetWriter<W> {
    fn accept_link(&mut self, source: InstanceId, link: Link) -> Result<()> {
        self.open_line(source)?;
        write!(self.out, " {}:{}", link.target.as_unsigned(), link.weight)?;
        Ok(())
    }

    fn finish_source(&mut self, source: InstanceId) -> Result<()> {
        self.open_line(source)?;
        writeln!(self.out)?;
        self.line_open = false;
        Ok(())
    }

    /// Every instance is a source once, so it already has its own line.
    fn accept_isolated(&mut self, _id: InstanceId) -> Result<()> {
        Ok(())
    }
}

/// Save the clustering input network of `source` to `path`.
pub fn save_net<S: SimilaritySource + ?Sized>(source: &S, options: &NetOptions, path: &Path) -> Result<()> {
    options.validate()?;
    let out = BufWriter::new(File::create(path)?);
    let mut writer = NetWriter::new(out, source.instances().len(), options.cuts_links())?;
    let stats = build_links(source, options, &mut writer)?;
    writer.into_inner()?;
    tracing::info!(path = %path.display(), sources = stats.sources, links = stats.links, "the network is saved");
    Ok(())
}
