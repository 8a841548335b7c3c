//! Generated document used by the demo binary and the UI tests.

use rich_pad_core::document::Document;
use rich_pad_core::element::{ImageData, Paragraph, RichTextElement};
use rich_pad_core::style::{FontFamily, FontSlant, FontWeight, TextStyle};

/// Every this many paragraphs one carries an inline image.
const IMAGE_EVERY: usize = 25;

const SENTENCES: [&str; 6] = [
    "The quick brown fox jumps over the lazy dog while the scroller keeps only a handful of rows laid out.",
    "Paragraphs wrap at word boundaries; tokens longer than the break threshold are split wherever they run out of room.",
    "Undo and redo replay inverse actions, so every structural edit can be taken back one group at a time.",
    "Short line.",
    "Supercalifragilisticexpialidocious_and_then_some_more_characters_without_a_single_space_in_sight keeps going.",
    "Rows below the window are never measured; their height is estimated from the rows seen so far.",
];

fn heading_style() -> TextStyle {
    TextStyle::default()
        .with_point_size(18)
        .with_weight(FontWeight::Bold)
}

fn code_style() -> TextStyle {
    TextStyle::default().with_face(FontFamily::Modern, None)
}

/// A small opaque gradient, encoded as PNG.
pub fn sample_image(width: u32, height: u32) -> ImageData {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        image::Rgba([r, g, 160, 255])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    if let Err(e) = img.write_to(&mut out, image::ImageFormat::Png) {
        tracing::warn!("Failed to encode sample image: {e}");
    }
    ImageData::new(out.into_inner())
}

fn paragraph(index: usize, image: &ImageData) -> Paragraph {
    let sentence = SENTENCES[index % SENTENCES.len()];
    if index % IMAGE_EVERY == IMAGE_EVERY - 1 {
        return Paragraph::new(vec![
            RichTextElement::run(format!("Figure {}: ", index / IMAGE_EVERY + 1)),
            RichTextElement::image(image.clone()),
            RichTextElement::run(" a gradient between two runs."),
        ]);
    }
    match index % 10 {
        0 => Paragraph::new(vec![RichTextElement::styled_run(
            format!("Section {}", index / 10 + 1),
            heading_style(),
        )]),
        3 => Paragraph::new(vec![
            RichTextElement::run("Mixed styles: "),
            RichTextElement::styled_run("bold", TextStyle::default().with_weight(FontWeight::Bold)),
            RichTextElement::run(", "),
            RichTextElement::styled_run(
                "italic",
                TextStyle::default().with_slant(FontSlant::Italic),
            ),
            RichTextElement::run(" and "),
            RichTextElement::styled_run("underlined", TextStyle::default().with_underline(true)),
            RichTextElement::run(format!(" text. {sentence}")),
        ]),
        7 => Paragraph::new(vec![RichTextElement::styled_run(
            format!("let paragraph = document.paragraph({index});"),
            code_style(),
        )]),
        8 => Paragraph::empty(),
        _ => Paragraph::from_text(format!("{index}. {sentence}")),
    }
}

/// A document of `count` paragraphs mixing headings, styled runs, code,
/// empty paragraphs and images. At least one paragraph is produced.
pub fn sample_document(count: usize) -> Document {
    let image = sample_image(48, 32);
    Document::new((0..count.max(1)).map(|i| paragraph(i, &image)).collect())
}
