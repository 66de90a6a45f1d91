//! The diagnostic view: renders the arena as a character grid.
//!
//! Same per-column sampling and boundary-marker idea as a C allocator's
//! `mem_dump`, re-expressed without pointer walks and routed through
//! `log::info!` instead of `printf`.

use crate::config::PG_SIZE;
use crate::header::BlockHeader;
use crate::page::PageState;
use crate::small;

/// Number of columns rendered per page line.
pub(crate) const DUMP_WIDTH: usize = 120;

/// Render one page's line as a fixed-width ASCII strip.
///
/// - space: `Free` page, or dead space past the last header on a
///   multi-block page.
/// - `#`: an occupied small-block slot, or any column of a large
///   allocation (head or interior page).
/// - `-`: a free small-block slot.
/// - `!`: the first column of a new small block (boundary marker).
pub(crate) fn render_page(bytes: &[u8], state: &PageState, page_idx: usize) -> [u8; DUMP_WIDTH] {
    let mut line = [b' '; DUMP_WIDTH];
    match state {
        PageState::Free => {}
        PageState::SingleBlk { .. } | PageState::SIntermediate => {
            for c in line.iter_mut() {
                *c = b'#';
            }
        }
        PageState::MultiBlk { size_class, .. } => {
            let base = page_idx * PG_SIZE;
            let bytes_per_col = PG_SIZE / DUMP_WIDTH;
            let mut prev_header: Option<usize> = None;
            for (col, slot) in line.iter_mut().enumerate() {
                let addr = base + col * bytes_per_col;
                let hit = small::offsets(*size_class).find_map(|off| {
                    let header = BlockHeader::read_at(bytes, base + off);
                    if header.span(base + off).contains(&addr) {
                        Some((off, header))
                    } else {
                        None
                    }
                });
                *slot = match hit {
                    None => b' ',
                    Some((off, header)) => {
                        let is_new = prev_header != Some(off);
                        prev_header = Some(off);
                        if is_new {
                            b'!'
                        } else if header.busy {
                            b'#'
                        } else {
                            b'-'
                        }
                    }
                };
            }
        }
    }
    line
}
