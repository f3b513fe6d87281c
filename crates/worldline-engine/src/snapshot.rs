//! Plain-text snapshots of a world line.
//!
//! ```text
//! # worldline snapshot sites=<n> vertices=<m>
//! v <time> <bond> <l0><l1><l2><l3>
//! s <site> <istate> <pstate>
//! ```
//!
//! One `v` line per vertex in sequence order, then one `s` line per
//! site in index order. Times use the shortest representation that
//! parses back to the same `f64`.

use std::io::{BufRead, Write};

use worldline_arena::ArenaConfig;
use worldline_core::{BondId, SiteState, Vertex, LEG_SLOTS};
use worldline_model::Model;

use crate::error::EngineError;
use crate::world::WorldLine;

const HEADER: &str = "# worldline snapshot";

/// Write the active sequence and boundary states of `world` to `out`.
///
/// Nothing in `world` changes; an I/O failure is returned as
/// [`EngineError::Io`].
pub fn snapshot_show<W: Write + ?Sized>(
    world: &WorldLine,
    model: &Model,
    out: &mut W,
) -> Result<(), EngineError> {
    debug_assert_eq!(world.n_sites(), model.n_sites());
    let seq = world.sequence();
    writeln!(out, "{HEADER} sites={} vertices={}", world.n_sites(), seq.len())?;
    for v in seq {
        debug_assert!(v.bond.index() < model.bonds().len());
        let [a, b, c, d] = v.legs;
        writeln!(out, "v {} {} {a}{b}{c}{d}", v.time, v.bond)?;
    }
    for (s, (i, p)) in world.istate().iter().zip(world.pstate()).enumerate() {
        writeln!(out, "s {s} {i} {p}")?;
    }
    Ok(())
}

/// A parsed snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotDump {
    /// Number of sites from the header.
    pub n_sites: usize,
    /// Vertices in sequence order.
    pub vertices: Vec<Vertex>,
    /// Site states at τ = 0.
    pub istate: Vec<SiteState>,
    /// Site states at τ = 1.
    pub pstate: Vec<SiteState>,
}

impl SnapshotDump {
    /// Rebuild a world line from the dump.
    pub fn into_world(self, model: &Model, config: ArenaConfig) -> Result<WorldLine, EngineError> {
        WorldLine::from_parts(model, &self.vertices, self.istate, self.pstate, config)
    }
}

fn malformed(line: usize, detail: impl Into<String>) -> EngineError {
    EngineError::MalformedSnapshot {
        line,
        detail: detail.into(),
    }
}

fn parse_state(line: usize, field: &str) -> Result<SiteState, EngineError> {
    let mut chars = field.chars();
    match (chars.next().and_then(SiteState::from_digit), chars.next()) {
        (Some(s), None) => Ok(s),
        _ => Err(malformed(line, format!("bad site state '{field}'"))),
    }
}

fn parse_header(line: usize, text: &str) -> Result<(usize, usize), EngineError> {
    let rest = text
        .strip_prefix(HEADER)
        .ok_or_else(|| malformed(line, "missing snapshot header"))?;
    let mut sites = None;
    let mut vertices = None;
    for field in rest.split_whitespace() {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| malformed(line, format!("bad header field '{field}'")))?;
        let n: usize = value
            .parse()
            .map_err(|_| malformed(line, format!("bad count '{value}'")))?;
        match key {
            "sites" => sites = Some(n),
            "vertices" => vertices = Some(n),
            _ => return Err(malformed(line, format!("unknown header field '{key}'"))),
        }
    }
    match (sites, vertices) {
        (Some(s), Some(v)) => Ok((s, v)),
        _ => Err(malformed(line, "header needs sites= and vertices=")),
    }
}

fn parse_vertex(line: usize, fields: &[&str]) -> Result<Vertex, EngineError> {
    let [time, bond, legs] = fields else {
        return Err(malformed(line, "vertex line needs time, bond, legs"));
    };
    let time: f64 = time
        .parse()
        .map_err(|_| malformed(line, format!("bad time '{time}'")))?;
    if !(0.0..1.0).contains(&time) {
        return Err(malformed(line, format!("time {time} outside [0, 1)")));
    }
    let bond: u32 = bond
        .parse()
        .map_err(|_| malformed(line, format!("bad bond '{bond}'")))?;
    let digits: Vec<SiteState> = legs.chars().filter_map(SiteState::from_digit).collect();
    let states: [SiteState; LEG_SLOTS] = digits
        .try_into()
        .ok()
        .filter(|_| legs.len() == LEG_SLOTS)
        .ok_or_else(|| malformed(line, format!("bad legs '{legs}'")))?;
    Ok(Vertex::with_legs(time, BondId(bond), states))
}

/// Parse a snapshot written by [`snapshot_show`].
///
/// # Errors
///
/// [`EngineError::MalformedSnapshot`] with the 1-based line number of
/// the first problem, or [`EngineError::Io`] if reading fails.
pub fn read_snapshot<R: BufRead>(reader: R) -> Result<SnapshotDump, EngineError> {
    let mut lines = reader.lines();
    let header = lines.next().transpose()?.ok_or_else(|| malformed(1, "empty snapshot"))?;
    let (n_sites, n_vertices) = parse_header(1, &header)?;

    let mut dump = SnapshotDump {
        n_sites,
        vertices: Vec::with_capacity(n_vertices),
        istate: Vec::with_capacity(n_sites),
        pstate: Vec::with_capacity(n_sites),
    };
    for (i, text) in lines.enumerate() {
        let line = i + 2;
        let text = text?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        match fields.split_first() {
            None => continue,
            Some((&"v", rest)) => {
                if !dump.istate.is_empty() {
                    return Err(malformed(line, "vertex after site lines"));
                }
                dump.vertices.push(parse_vertex(line, rest)?);
            }
            Some((&"s", [site, i, p])) => {
                let site: usize = site
                    .parse()
                    .map_err(|_| malformed(line, format!("bad site '{site}'")))?;
                if site != dump.istate.len() {
                    return Err(malformed(line, format!("site {site} out of order")));
                }
                dump.istate.push(parse_state(line, i)?);
                dump.pstate.push(parse_state(line, p)?);
            }
            Some((tag, _)) => return Err(malformed(line, format!("unexpected line '{tag}'"))),
        }
    }

    if dump.vertices.len() != n_vertices {
        return Err(malformed(
            0,
            format!("header says {n_vertices} vertices, found {}", dump.vertices.len()),
        ));
    }
    if dump.istate.len() != n_sites {
        return Err(malformed(
            0,
            format!("header says {n_sites} sites, found {}", dump.istate.len()),
        ));
    }
    Ok(dump)
}
