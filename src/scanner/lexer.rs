use winnow::combinator::{alt, cut_err, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location, Stream};
use winnow::token::{any, one_of, take_till, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Literal, Span, Token, TokenKind, keyword_kind};
use crate::scanner::unicode::{is_digit, is_identifier_char, normalize_name, to_ascii_digit};

type Input<'a> = LocatingSlice<&'a str>;

fn shebang<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    ("#!", take_till(0.., '\n'), opt('\n'))
        .void()
        .parse_next(input)
}

fn whitespace<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    take_while(0.., |c: char| {
        c == ' ' || c == '\t' || c == '\r' || c == '\n'
    })
    .void()
    .parse_next(input)
}

/// Quoted text with no escape processing. The closing quote must match the
/// opening one; running out of input is a cut so the caller can report it.
fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let contents: &str = take_till(0.., quote).parse_next(input)?;
    cut_err(quote).parse_next(input)?;
    let end = input.current_token_start();
    Ok(
        Token::new(TokenKind::String, contents, Span::new(start, end - start))
            .with_literal(Literal::Str(contents.to_string())),
    )
}

/// A run of ASCII or Devanagari digits with at most one `.`. Digits are
/// normalized to ASCII before the value is parsed. Integers too large for
/// an `i64` widen to a float literal.
fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let whole: &str = take_while(1.., is_digit).parse_next(input)?;
    let fraction: Option<&str> = opt(preceded('.', take_while(0.., is_digit))).parse_next(input)?;
    let end = input.current_token_start();
    let span = Span::new(start, end - start);

    let mut lexeme: String = whole.chars().map(to_ascii_digit).collect();
    match fraction {
        None => {
            let literal = match lexeme.parse::<i64>() {
                Ok(n) => Literal::Int(n),
                Err(_) => lexeme
                    .parse::<f64>()
                    .map(Literal::Float)
                    .map_err(|_| ErrMode::Cut(ContextError::new()))?,
            };
            Ok(Token::new(TokenKind::Int, lexeme, span).with_literal(literal))
        }
        Some(fraction) => {
            lexeme.push('.');
            lexeme.extend(fraction.chars().map(to_ascii_digit));
            let value: f64 = lexeme
                .parse()
                .map_err(|_| ErrMode::Cut(ContextError::new()))?;
            Ok(Token::new(TokenKind::Float, lexeme, span).with_literal(Literal::Float(value)))
        }
    }
}

/// Keywords are recognized after NFC normalization, so differently composed
/// spellings of the same word lex alike.
fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let raw: &str = take_while(1.., is_identifier_char).parse_next(input)?;
    let end = input.current_token_start();
    let name = normalize_name(raw).into_owned();
    let kind = keyword_kind(&name).unwrap_or(TokenKind::Identifier);
    Ok(Token::new(kind, name, Span::new(start, end - start)))
}

fn two_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    "==".parse_next(input)?;
    Ok(Token::new(TokenKind::EqualEqual, "==", Span::new(start, 2)))
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "+-*/%()[],;<>=".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        '=' => TokenKind::Equal,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, c.len_utf8())))
}

fn scan_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    alt((
        string_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Scan all tokens from source, returning either a token list or scan errors.
pub fn scan_all(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let mut input = LocatingSlice::new(source);
    let _ = opt(shebang).parse_next(&mut input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        if whitespace(&mut input).is_err() || input.is_empty() {
            break;
        }
        let checkpoint = input.checkpoint();
        match scan_token(&mut input) {
            Ok(token) => tokens.push(token),
            Err(_) => {
                input.reset(&checkpoint);
                let offset = input.current_token_start();
                let ch = any::<_, ContextError>.parse_next(&mut input).unwrap_or('?');
                if ch == '"' || ch == '\'' {
                    let len = source.len() - offset;
                    errors.push(CompileError::lex("unterminated string literal", offset, len));
                    break;
                }
                if is_digit(ch) {
                    let rest: &str =
                        take_while::<_, _, ContextError>(0.., |c: char| is_digit(c) || c == '.')
                            .parse_next(&mut input)
                            .unwrap_or_default();
                    errors.push(CompileError::lex(
                        format!("malformed number literal '{ch}{rest}'"),
                        offset,
                        ch.len_utf8() + rest.len(),
                    ));
                    continue;
                }
                errors.push(CompileError::lex(
                    format!("unexpected character '{ch}'"),
                    offset,
                    ch.len_utf8(),
                ));
            }
        }
    }

    let eof_offset = source.len();
    tokens.push(Token::new(TokenKind::Eof, "", Span::new(eof_offset, 0)));
    tracing::debug!(tokens = tokens.len(), errors = errors.len(), "scan finished");

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::scanner::token::Keyword;

    fn scan_ok(source: &str) -> Vec<Token> {
        scan_all(source).expect("scan should succeed")
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        let tokens = scan_ok("+-*/%()[],;<>=");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn equal_needs_one_char_lookahead() {
        assert_eq!(
            kinds(&scan_ok("== = ===")),
            vec![
                TokenKind::EqualEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn relational_pairs_stay_single_char() {
        assert_eq!(
            kinds(&scan_ok("<= >=")),
            vec![
                TokenKind::Less,
                TokenKind::Equal,
                TokenKind::Greater,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    #[case("\"नमस्ते\"", "नमस्ते")]
    #[case("'single'", "single")]
    #[case("\"it's\"", "it's")]
    #[case("\"no\\nescape\"", "no\\nescape")]
    #[case("''", "")]
    fn string_literals(#[case] source: &str, #[case] expected: &str) {
        let tokens = scan_ok(source);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, Some(Literal::Str(expected.to_string())));
    }

    #[rstest]
    #[case("42", Literal::Int(42))]
    #[case("४२", Literal::Int(42))]
    #[case("४2", Literal::Int(42))]
    #[case("3.25", Literal::Float(3.25))]
    #[case("३.२५", Literal::Float(3.25))]
    #[case("7.", Literal::Float(7.0))]
    fn number_literals(#[case] source: &str, #[case] expected: Literal) {
        let tokens = scan_ok(source);
        assert_eq!(tokens[0].literal, Some(expected));
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn local_digits_match_ascii_digits() {
        let local = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];
        for n in [0u32, 7, 10, 305, 9081, 123_456, 1_000_001] {
            let ascii = n.to_string();
            let mixed: String = ascii
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    let d = c.to_digit(10).expect("ascii digit") as usize;
                    if i % 2 == 0 { local[d] } else { c }
                })
                .collect();
            assert_eq!(scan_ok(&mixed)[0].literal, scan_ok(&ascii)[0].literal);

            let float_ascii = format!("{ascii}.{ascii}");
            let float_mixed = format!("{mixed}.{mixed}");
            assert_eq!(
                scan_ok(&float_mixed)[0].literal,
                scan_ok(&float_ascii)[0].literal
            );
        }
    }

    #[test]
    fn second_separator_is_not_part_of_number() {
        let result = scan_all("1.2.3");
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'.'"));
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = scan_ok("चर अ = ५");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Int,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[1].lexeme, "अ");
    }

    #[test]
    fn all_keywords() {
        let source = "चर यदि तदा अन्यथा पर्यंतम् प्रति प्रत्याययतु प्रत्यावर्तयतु लिखतु पठतु \
                      प्रारभ्य समाप्य विस्मर्यताम् सत्यम् असत्यम् शून्यम् न";
        let tokens = scan_ok(source);
        assert_eq!(tokens.len(), 18);
        assert!(
            tokens[..17]
                .iter()
                .all(|t| matches!(t.kind, TokenKind::Keyword(_)))
        );
    }

    #[test]
    fn identifier_includes_combining_marks() {
        let tokens = scan_ok("संख्या_१");
        // Digits are not identifier characters.
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Identifier, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(tokens[0].lexeme, "संख्या_");
    }

    #[test]
    fn identifiers_are_nfc_normalized() {
        let composed = scan_ok("caf\u{00E9}");
        let decomposed = scan_ok("cafe\u{0301}");
        assert_eq!(composed[0].lexeme, decomposed[0].lexeme);
        assert_eq!(decomposed[0].span, Span::new(0, 6));
    }

    #[test]
    fn nukta_spellings_lex_to_one_name() {
        // NNNA (U+0929) and NA + NUKTA are canonically equivalent.
        let precomposed = scan_ok("\u{0929}");
        let decomposed = scan_ok("\u{0928}\u{093C}");
        assert_eq!(precomposed[0].kind, TokenKind::Identifier);
        assert_eq!(precomposed[0].lexeme, decomposed[0].lexeme);
        // The bare NA is a keyword; with a nukta it is a different word.
        assert_eq!(scan_ok("\u{0928}")[0].kind, TokenKind::Keyword(Keyword::Not));
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = scan_ok("चर x = 42;");
        assert_eq!(tokens[0].span, Span::new(0, 6)); // चर
        assert_eq!(tokens[1].span, Span::new(7, 1)); // x
        assert_eq!(tokens[2].span, Span::new(9, 1)); // =
        assert_eq!(tokens[3].span, Span::new(11, 2)); // 42
        assert_eq!(tokens[4].span, Span::new(13, 1)); // ;
    }

    #[test]
    fn whitespace_including_crlf_is_skipped() {
        let tokens = scan_ok("क\r\n\t ख");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn unexpected_character_error() {
        let errors = scan_all("चर x = @;").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains('@'));
    }

    #[test]
    fn every_unexpected_character_is_reported() {
        let errors = scan_all("{ x }").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unterminated_string_error() {
        let errors = scan_all("लिखतु(\"unterminated").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("unterminated"));
    }

    #[test]
    fn mismatched_quotes_are_unterminated() {
        assert!(scan_all("\"text'").is_err());
    }

    #[rstest]
    #[case("9223372036854775807", Literal::Int(i64::MAX))]
    #[case("9223372036854775808", Literal::Float(9_223_372_036_854_775_808.0))]
    #[case("99999999999999999999999", Literal::Float(1e23))]
    #[case("१००००००००००००००००००००", Literal::Float(1e20))]
    fn oversized_integers_widen_to_float(#[case] source: &str, #[case] expected: Literal) {
        let tokens = scan_ok(source);
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].literal, Some(expected));
    }

    #[rstest]
    #[case("shebang only", "#!/usr/bin/env garuda", &[TokenKind::Eof])]
    #[case(
        "shebang with newline and code",
        "#!/usr/bin/env garuda\nक;",
        &[TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]
    )]
    #[case(
        "no shebang unaffected",
        "क;",
        &[TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]
    )]
    fn shebang_cases(#[case] _label: &str, #[case] source: &str, #[case] expected: &[TokenKind]) {
        let tokens = scan_ok(source);
        assert_eq!(kinds(&tokens), expected);
    }
}
