// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG path data for [`Path`].

use alloc::string::String;
use core::fmt::{self, Write};

use crate::{Path, PathElement, Point32};

impl Path {
    /// Convert the path to an SVG path data string.
    ///
    /// Only absolute commands are written, with every coordinate in full.
    pub fn to_svg(&self) -> String {
        let mut result = String::new();
        // Writing into a `String` can't fail.
        let _ = self.write_svg(&mut result);
        result
    }

    /// Write the path as SVG path data.
    ///
    /// # Errors
    ///
    /// Propagates errors from `writer`.
    pub fn write_svg<W: Write>(&self, mut writer: W) -> fmt::Result {
        for (i, el) in self.elements().iter().enumerate() {
            if i > 0 {
                writer.write_char(' ')?;
            }
            match *el {
                PathElement::MoveTo(p) => write!(writer, "M{} {}", p.x, p.y)?,
                PathElement::LineTo(p) => write!(writer, "L{} {}", p.x, p.y)?,
                PathElement::QuadTo(p1, p2) => {
                    write!(writer, "Q{} {} {} {}", p1.x, p1.y, p2.x, p2.y)?;
                }
                PathElement::CubicTo(p1, p2, p3) => write!(
                    writer,
                    "C{} {} {} {} {} {}",
                    p1.x, p1.y, p2.x, p2.y, p3.x, p3.y
                )?,
                PathElement::Close => writer.write_char('Z')?,
            }
        }
        Ok(())
    }

    /// Parse SVG path data.
    ///
    /// The commands `M`, `L`, `H`, `V`, `Q`, `C` and `Z` are supported, in
    /// both their absolute and relative forms, including implicit repetition
    /// of the previous command.
    ///
    /// # Errors
    ///
    /// Returns an error when the data contains an unsupported command, a
    /// malformed number, does not start with a moveto, or ends in the middle
    /// of a command.
    pub fn from_svg(data: &str) -> Result<Path, SvgParseError> {
        let mut lexer = SvgLexer::new(data);
        let mut path = Path::new();
        let mut last_cmd = 0;
        while let Some(c) = lexer.get_cmd(last_cmd) {
            if path.is_empty() && c != b'm' && c != b'M' {
                return Err(SvgParseError::Wrong);
            }
            match c {
                b'm' | b'M' => {
                    let pt = lexer.get_maybe_relative(c)?;
                    path.move_to(pt);
                    lexer.last_pt = pt;
                    lexer.start_pt = pt;
                    // Further coordinate pairs are implicit lineto commands.
                    last_cmd = c - (b'M' - b'L');
                }
                b'l' | b'L' => {
                    let pt = lexer.get_maybe_relative(c)?;
                    path.line_to(pt);
                    lexer.last_pt = pt;
                    last_cmd = c;
                }
                b'h' | b'H' => {
                    let mut x = lexer.get_number()?;
                    if c == b'h' {
                        x += lexer.last_pt.x;
                    }
                    let pt = Point32::new(x, lexer.last_pt.y);
                    path.line_to(pt);
                    lexer.last_pt = pt;
                    last_cmd = c;
                }
                b'v' | b'V' => {
                    let mut y = lexer.get_number()?;
                    if c == b'v' {
                        y += lexer.last_pt.y;
                    }
                    let pt = Point32::new(lexer.last_pt.x, y);
                    path.line_to(pt);
                    lexer.last_pt = pt;
                    last_cmd = c;
                }
                b'q' | b'Q' => {
                    let p1 = lexer.get_maybe_relative(c)?;
                    let p2 = lexer.get_maybe_relative(c)?;
                    path.quad_to(p1, p2);
                    lexer.last_pt = p2;
                    last_cmd = c;
                }
                b'c' | b'C' => {
                    let p1 = lexer.get_maybe_relative(c)?;
                    let p2 = lexer.get_maybe_relative(c)?;
                    let p3 = lexer.get_maybe_relative(c)?;
                    path.cubic_to(p1, p2, p3);
                    lexer.last_pt = p3;
                    last_cmd = c;
                }
                b'z' | b'Z' => {
                    path.close();
                    lexer.last_pt = lexer.start_pt;
                    last_cmd = 0;
                }
                _ => return Err(SvgParseError::UnknownCommand(c as char)),
            }
        }
        lexer.skip_ws();
        if lexer.ix < data.len() {
            return Err(SvgParseError::Wrong);
        }
        Ok(path)
    }
}

/// An error which can be returned when parsing an SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgParseError {
    /// A number or command was expected but something else was found.
    Wrong,
    /// The input string ended while still expecting input.
    UnexpectedEof,
    /// Encountered an unknown or unsupported command.
    UnknownCommand(char),
}

impl fmt::Display for SvgParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgParseError::Wrong => write!(f, "Unable to parse a number or command"),
            SvgParseError::UnexpectedEof => write!(f, "Unexpected EOF"),
            SvgParseError::UnknownCommand(letter) => write!(f, "Unknown command, \"{letter}\""),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SvgParseError {}

struct SvgLexer<'a> {
    data: &'a str,
    ix: usize,
    last_pt: Point32,
    start_pt: Point32,
}

impl SvgLexer<'_> {
    fn new(data: &str) -> SvgLexer<'_> {
        SvgLexer {
            data,
            ix: 0,
            last_pt: Point32::ZERO,
            start_pt: Point32::ZERO,
        }
    }

    fn skip_ws(&mut self) {
        while let Some(&c) = self.data.as_bytes().get(self.ix) {
            if !(c == b' ' || c == 9 || c == 10 || c == 12 || c == 13) {
                break;
            }
            self.ix += 1;
        }
    }

    fn get_cmd(&mut self, last_cmd: u8) -> Option<u8> {
        self.skip_ws();
        if let Some(c) = self.get_byte() {
            if c.is_ascii_alphabetic() {
                return Some(c);
            } else if last_cmd != 0 && (c == b'-' || c == b'+' || c == b'.' || c.is_ascii_digit())
            {
                // Plausible number start
                self.unget();
                return Some(last_cmd);
            } else {
                self.unget();
            }
        }
        None
    }

    fn get_byte(&mut self) -> Option<u8> {
        self.data.as_bytes().get(self.ix).map(|&c| {
            self.ix += 1;
            c
        })
    }

    fn unget(&mut self) {
        self.ix -= 1;
    }

    fn get_digits(&mut self) -> usize {
        let mut digit_count = 0;
        while let Some(c) = self.get_byte() {
            if c.is_ascii_digit() {
                digit_count += 1;
            } else {
                self.unget();
                break;
            }
        }
        digit_count
    }

    fn get_number(&mut self) -> Result<f32, SvgParseError> {
        self.skip_ws();
        let start = self.ix;
        let c = self.get_byte().ok_or(SvgParseError::UnexpectedEof)?;
        if !(c == b'-' || c == b'+') {
            self.unget();
        }
        let mut digit_count = self.get_digits();
        if let Some(c) = self.get_byte() {
            if c == b'.' {
                digit_count += self.get_digits();
            } else {
                self.unget();
            }
        }
        if digit_count == 0 {
            return Err(SvgParseError::Wrong);
        }
        if let Some(c) = self.get_byte() {
            if c == b'e' || c == b'E' {
                if let Some(sign) = self.get_byte() {
                    if !(sign == b'-' || sign == b'+') {
                        self.unget();
                    }
                }
                if self.get_digits() == 0 {
                    return Err(SvgParseError::Wrong);
                }
            } else {
                self.unget();
            }
        }
        self.data[start..self.ix]
            .parse()
            .map_err(|_| SvgParseError::Wrong)
    }

    fn get_number_pair(&mut self) -> Result<Point32, SvgParseError> {
        let x = self.get_number()?;
        self.opt_comma();
        let y = self.get_number()?;
        self.opt_comma();
        Ok(Point32::new(x, y))
    }

    fn get_maybe_relative(&mut self, cmd: u8) -> Result<Point32, SvgParseError> {
        let pt = self.get_number_pair()?;
        if cmd.is_ascii_lowercase() {
            Ok(Point32::new(pt.x + self.last_pt.x, pt.y + self.last_pt.y))
        } else {
            Ok(pt)
        }
    }

    fn opt_comma(&mut self) {
        self.skip_ws();
        if let Some(c) = self.get_byte() {
            if c != b',' {
                self.unget();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Path, PathElement, Point32, SvgParseError};

    #[test]
    fn parse_relative() {
        let path = Path::from_svg("m10 10 100 0 0 100 -100 0z").unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.elements()[3], PathElement::LineTo(Point32::new(10., 110.)));
        assert_eq!(path.elements()[4], PathElement::Close);
    }

    #[test]
    fn parse_all_commands() {
        let path = Path::from_svg("M1,2 H5 v3 h-1 V0 Q1 1 2 2 q1 0 1 1 C0 0 1 1 2 2 c1 1 2 2 3 3 L0 0 Z").unwrap();
        let expected = [
            PathElement::MoveTo(Point32::new(1., 2.)),
            PathElement::LineTo(Point32::new(5., 2.)),
            PathElement::LineTo(Point32::new(5., 5.)),
            PathElement::LineTo(Point32::new(4., 5.)),
            PathElement::LineTo(Point32::new(4., 0.)),
            PathElement::QuadTo(Point32::new(1., 1.), Point32::new(2., 2.)),
            PathElement::QuadTo(Point32::new(3., 2.), Point32::new(3., 3.)),
            PathElement::CubicTo(Point32::new(0., 0.), Point32::new(1., 1.), Point32::new(2., 2.)),
            PathElement::CubicTo(Point32::new(3., 3.), Point32::new(4., 4.), Point32::new(5., 5.)),
            PathElement::LineTo(Point32::new(0., 0.)),
            PathElement::Close,
        ];
        assert_eq!(path.elements(), &expected);
    }

    #[test]
    fn relative_after_close() {
        let path = Path::from_svg("M10 10 L20 10 z l5 5").unwrap();
        assert_eq!(path.elements()[3], PathElement::LineTo(Point32::new(15., 15.)));
    }

    #[test]
    fn numbers() {
        let path = Path::from_svg("M-1.5.5L1e2-2E-1").unwrap();
        assert_eq!(path.elements()[0], PathElement::MoveTo(Point32::new(-1.5, 0.5)));
        assert_eq!(path.elements()[1], PathElement::LineTo(Point32::new(100., -0.2)));
    }

    #[test]
    fn errors() {
        assert_eq!(Path::from_svg("M1 2 A1 1 0 0 0 2 2"), Err(SvgParseError::UnknownCommand('A')));
        assert_eq!(Path::from_svg("M1"), Err(SvgParseError::UnexpectedEof));
        assert_eq!(Path::from_svg("L1 2"), Err(SvgParseError::Wrong));
        assert_eq!(Path::from_svg("M1 2 Z 3"), Err(SvgParseError::Wrong));
        assert_eq!(Path::from_svg("M1 x"), Err(SvgParseError::Wrong));
        assert_eq!(Path::from_svg(""), Ok(Path::new()));
    }

    #[test]
    fn round_trip() {
        let text = "M0.1 -2.5 L3 4 Q5 6 7 8 C1 2 3 4 5.25 6 Z";
        let path = Path::from_svg(text).unwrap();
        assert_eq!(path.to_svg(), text);
        assert_eq!(Path::from_svg(&path.to_svg()), Ok(path));
    }
}
