use std::io::Write;

use anyhow::Result;

use super::instructions::{DrawInstruction, Surface};

/// Writes draw instructions as a standalone SVG document, in order.
pub fn write_svg<'a, W, I>(instructions: I, surface: &Surface, mut writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a DrawInstruction>,
{
    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" fill="none">"#,
        surface.width, surface.height
    )?;

    let stroke = surface.stroke_width;
    for instruction in instructions {
        match instruction {
            DrawInstruction::Ring { center, radius } => writeln!(
                writer,
                concat!(
                    r##"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" stroke="#888" "##,
                    r#"stroke-width="{stroke}" fill="none" />"#,
                ),
                center.x,
                center.y,
                radius,
                stroke = stroke,
            )?,
            DrawInstruction::PlaceNode {
                id,
                position,
                radius,
                fill,
                label,
            } => {
                writeln!(
                    writer,
                    concat!(
                        r#"  <circle id="{}" cx="{:.2}" cy="{:.2}" r="{radius}" "#,
                        r#"stroke="white" stroke-width="{stroke}" fill="{}" />"#,
                    ),
                    escape_xml(id),
                    position.x,
                    position.y,
                    fill.hex(),
                    radius = radius,
                    stroke = stroke,
                )?;
                writeln!(
                    writer,
                    concat!(
                        r#"  <text style="font: italic {}px sans-serif" "#,
                        r##"x="{:.2}" y="{:.2}" fill="#222">{}</text>"##,
                    ),
                    surface.font_size,
                    position.x + 5.0,
                    position.y - 5.0,
                    escape_xml(label)
                )?;
            }
            DrawInstruction::Connect { from, to } => writeln!(
                writer,
                concat!(
                    r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" "#,
                    r##"stroke="#999" stroke-width="{stroke}" />"##,
                ),
                from.x,
                from.y,
                to.x,
                to.y,
                stroke = stroke,
            )?,
        }
    }

    writeln!(writer, "</svg>")?;
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;
    use crate::render::FillKind;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("AT&T <core>"), "AT&amp;T &lt;core&gt;");
        assert_eq!(escape_xml("plain\u{1b}[0m"), "plain[0m");
    }

    #[test]
    fn writes_every_instruction() {
        let instructions = vec![
            DrawInstruction::Ring {
                center: Point::new(650.0, 540.0),
                radius: 1.0,
            },
            DrawInstruction::PlaceNode {
                id: "ip-8.8.8.8".to_owned(),
                position: Point::new(700.0, 600.0),
                radius: 5.0,
                fill: FillKind::Destination,
                label: "8.8.8.8 (Mountain View, US, AS15169, GOOGLE)".to_owned(),
            },
            DrawInstruction::Connect {
                from: Point::new(650.0, 540.0),
                to: Point::new(700.0, 600.0),
            },
        ];

        let mut out = Vec::new();
        write_svg(&instructions, &Surface::SCREEN, &mut out).expect("svg written");
        let svg = String::from_utf8(out).expect("utf-8");

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r##"r="1.00" stroke="#888""##));
        assert!(svg.contains(r#"id="ip-8.8.8.8""#));
        assert!(svg.contains(r##"fill="#77cc98""##));
        assert!(svg.contains(r#"x1="650.00" y1="540.00" x2="700.00" y2="600.00""#));
        assert!(svg.contains("GOOGLE)</text>"));
    }
}
