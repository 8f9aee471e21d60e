//! Text run layout: words are measured from glyph metrics, placed by the
//! boxer, and flushed into one render text element per line.

use crate::boxer::FlowOutcome;
use crate::chunker::{ChunkKind, Chunker};
use crate::render::{RenderChar, RenderId, RenderText};
use crate::{LayoutContext, LayoutInput, LayoutOutput, RestartPoints};
use flow_dom::{InternalId, NodeId};
use flow_glyphs::{Font, Glyph, GlyphCacheKey};
use flow_style::{Color, StyleCategory};
use flow_units::{FontId, Pos, PosBox};
use log::{trace, warn};
use smallvec::SmallVec;

/// Per text node values shared by every word.
struct TextStyle {
    internal_id: InternalId,
    font_id: FontId,
    font_size_px: u16,
    color: Color,
    subpixel: bool,
    ascender: Pos,
    line_height: Pos,
    space_width: Pos,
}

/// A word's width and its characters relative to the word's left edge.
struct MeasuredWord {
    width: Pos,
    chars: SmallVec<RenderChar, 16>,
}

/// The run currently receiving characters.
struct OpenRun {
    id: RenderId,
    left: Pos,
    top: Pos,
    chars: Vec<RenderChar>,
}

impl LayoutContext<'_> {
    /// Lay out a text node into its parent's current line, continuing from
    /// the character offset on `restarts` if a restart is in progress.
    pub fn run_text(&mut self, node: NodeId, input: &LayoutInput, restarts: &mut RestartPoints) -> LayoutOutput {
        let doc = self.doc;
        let dom_node = doc.node(node);
        let text = dom_node.text().unwrap_or_default();
        let offset = restarts.pop_last().unwrap_or(0);
        if !restarts.is_empty() {
            leaf_restart_not_drained(dom_node.internal_id, restarts);
        }

        let font_id = self.stack.get(StyleCategory::FontFamily).font();
        let font_height = self.compute_dimension(input.parent_height, self.stack.get(StyleCategory::FontSize).size());
        let font_size_px = font_height.map_or(0.0, Pos::to_px).round();
        if font_size_px < 1.0 {
            return LayoutOutput::text(None, None);
        }
        let font_size_px = font_size_px.min(f32::from(u16::MAX)) as u16;
        let Some(font) = self.fonts.get(font_id) else {
            warn!(target: "flow::text", "font {font_id:?} is not registered, skipping {:?}", dom_node.internal_id);
            return LayoutOutput::text(None, None);
        };

        let style = self.text_style(dom_node.internal_id, font_id, font_size_px, &font);
        let remaining = text.get(offset..).unwrap_or_default();
        let run = self.generate_text_words(remaining, offset, &style, &font, input, restarts);
        LayoutOutput::text(run, run.map(|_| style.ascender))
    }

    fn text_style(&self, internal_id: InternalId, font_id: FontId, font_size_px: u16, font: &Font) -> TextStyle {
        let size = i32::from(font_size_px);
        let mut space_width = Pos::from_x256(font.linear_hori_advance_space_x256) * size;
        if self.config.snap_subpixel_horz_text {
            space_width = space_width.round();
        }
        let mut line_height = Pos::from_x256(size * font.line_height_x256);
        if self.config.round_line_heights() {
            line_height = line_height.round_up();
        }
        TextStyle {
            internal_id,
            font_id,
            font_size_px,
            color: self.stack.get(StyleCategory::Color).color(),
            subpixel: self.config.enable_subpixel_text && font_size_px <= self.config.max_subpixel_glyph_size,
            ascender: Pos::from_x256(font.ascender_x256 * size),
            line_height,
            space_width,
        }
    }

    /// Place the words of `text`, which starts at byte `offset` of the node.
    /// Returns the last run emitted, if any.
    fn generate_text_words(
        &mut self,
        text: &str,
        offset: usize,
        style: &TextStyle,
        font: &Font,
        input: &LayoutInput,
        restarts: &mut RestartPoints,
    ) -> Option<RenderId> {
        let mut open: Option<OpenRun> = None;
        let mut last_run = None;

        for chunk in Chunker::new(text) {
            match chunk.kind {
                ChunkKind::Word => {
                    let word = text.get(chunk.start..chunk.end).unwrap_or_default();
                    let Some(measured) = self.measure_word(word, style, font) else {
                        continue;
                    };
                    let placed = match self.boxer.add_word(measured.width, style.line_height) {
                        FlowOutcome::Continue(placed) => placed,
                        FlowOutcome::FlowRestart => {
                            trace!(target: "flow::text", "word at {} does not fit", offset + chunk.start);
                            restarts.push(offset + chunk.start);
                            break;
                        }
                    };
                    let mut run = match open.take() {
                        Some(run) if run.top == placed.top => {
                            if let Some(element) = self.tree.get_mut(run.id) {
                                element.pos_mut().right = placed.right;
                            }
                            run
                        }
                        previous => {
                            if let Some(previous) = previous {
                                self.finish_text_run(previous);
                            }
                            let run = self.open_text_run(style, placed, input.parent_render);
                            last_run = Some(run.id);
                            run
                        }
                    };
                    let shift = placed.left - run.left;
                    run.chars.extend(measured.chars.iter().map(|placed_char| RenderChar {
                        x: placed_char.x + shift,
                        ..*placed_char
                    }));
                    open = Some(run);
                }
                ChunkKind::Space => {
                    let count = i32::try_from(chunk.len()).unwrap_or(i32::MAX);
                    self.boxer.add_space(style.space_width * count);
                }
                ChunkKind::LineBreak => {
                    self.boxer.add_new_line_character(style.line_height);
                    restarts.push(offset + chunk.end);
                    break;
                }
            }
        }

        if let Some(run) = open {
            self.finish_text_run(run);
        }
        last_run
    }

    fn open_text_run(&mut self, style: &TextStyle, placed: PosBox, parent: RenderId) -> OpenRun {
        let id = self.tree.push_text(
            parent,
            RenderText {
                internal_id: style.internal_id,
                pos: placed,
                font_id: style.font_id,
                font_size_px: style.font_size_px,
                color: style.color,
                subpixel: style.subpixel,
                chars: Vec::new(),
            },
        );
        OpenRun {
            id,
            left: placed.left,
            top: placed.top,
            chars: Vec::new(),
        }
    }

    fn finish_text_run(&mut self, run: OpenRun) {
        if let Some(text) = self.tree.text_mut(run.id) {
            text.chars = run.chars;
        }
    }

    /// Measure a word and record where each of its glyphs goes. Returns
    /// `None` if any glyph is missing from the cache; the missing keys are
    /// queued for rendering before the next pass.
    fn measure_word(&mut self, word: &str, style: &TextStyle, font: &Font) -> Option<MeasuredWord> {
        let size = i32::from(style.font_size_px);
        let mut pos_x = Pos::ZERO;
        let mut previous: Option<Glyph> = None;
        let mut missing = false;
        let mut chars = SmallVec::new();

        for character in word.chars() {
            let key = GlyphCacheKey::new(style.font_id, style.font_size_px, style.subpixel, character);
            let Some(glyph) = self.glyphs.get_glyph(&key) else {
                self.glyphs_needed.insert(key);
                missing = true;
                continue;
            };
            if glyph.is_null {
                previous = None;
                continue;
            }
            if self.config.enable_kerning
                && font.units_per_em > 0
                && let Some(previous) = previous
            {
                let kerning = font.kerning(previous.glyph_index, glyph.glyph_index);
                pos_x += kerning_offset(kerning, size, font.units_per_em);
            }
            chars.push(RenderChar {
                code: character,
                x: pos_x + Pos::from_x256(glyph.metric_left_x256),
                y: style.ascender - Pos::from_px_i32(glyph.metric_top),
            });
            pos_x += self.hori_advance(&glyph);
            previous = Some(glyph);
        }

        (!missing).then_some(MeasuredWord { width: pos_x, chars })
    }

    fn hori_advance(&self, glyph: &Glyph) -> Pos {
        if self.config.snap_subpixel_horz_text {
            Pos::from_px_i32(glyph.metric_hori_advance)
        } else {
            Pos::from_x256(glyph.metric_linear_hori_advance_x256)
        }
    }
}

/// Scale a kerning amount in font units to a position at `size` pixels.
/// `units_per_em` must be positive.
fn kerning_offset(kerning: i32, size: i32, units_per_em: i32) -> Pos {
    let scaled = ((i64::from(kerning) * i64::from(size)) << Pos::FRACTIONAL_BITS) / i64::from(units_per_em);
    Pos::from_raw(scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

#[cold]
#[expect(clippy::panic, reason = "a text node is a leaf and must consume the whole restart stack")]
fn leaf_restart_not_drained(internal_id: InternalId, restarts: &RestartPoints) -> ! {
    panic!("restart stack not drained at text node {internal_id:?}: {restarts:?}");
}
