#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    /// Quoted text, quotes included. An unterminated quote runs to end of input.
    Quoted(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word(s) | Token::Quoted(s) => s,
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self, Token::Quoted(_))
    }
}

/// Split input into words and quoted units. Never fails.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
            }
            '"' => {
                tokens.push(Token::Quoted(read_quoted(&chars, &mut i)));
            }
            _ => {
                tokens.push(Token::Word(read_word(&chars, &mut i)));
            }
        }
    }

    tokens
}

fn read_quoted(chars: &[char], i: &mut usize) -> String {
    let mut s = String::from('"');
    *i += 1; // skip opening quote
    while *i < chars.len() {
        s.push(chars[*i]);
        *i += 1;
        if chars[*i - 1] == '"' {
            return s;
        }
    }
    // unterminated: keep the rest of the input literally
    s.trim_end().to_string()
}

/// A quote right after `:` starts a quoted value (`topic:"Animal stories"`);
/// any other quote inside a word is kept, along with the quoted text.
fn read_word(chars: &[char], i: &mut usize) -> String {
    let mut word = String::new();
    while *i < chars.len() {
        match chars[*i] {
            '"' if word.ends_with(':') => break,
            '"' => word.push_str(&read_quoted(chars, i)),
            c if c.is_whitespace() => break,
            c => {
                word.push(c);
                *i += 1;
            }
        }
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_and_quotes() {
        let tokens = tokenize(r#"  dogs "black  birds" cats "#);
        assert_eq!(
            tokens,
            vec![
                Token::Word("dogs".to_string()),
                Token::Quoted("\"black  birds\"".to_string()),
                Token::Word("cats".to_string()),
            ]
        );
    }

    #[test]
    fn test_quote_breaks_word() {
        let tokens = tokenize(r#"topic:"Animal stories""#);
        assert_eq!(
            tokens,
            vec![
                Token::Word("topic:".to_string()),
                Token::Quoted("\"Animal stories\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_quote_inside_word_is_kept() {
        let tokens = tokenize(r#"abc"def ghi"jkl dogs"#);
        assert_eq!(
            tokens,
            vec![
                Token::Word("abc\"def ghi\"jkl".to_string()),
                Token::Word("dogs".to_string()),
            ]
        );

        let tokens = tokenize(r#"abc"def  ghi "#);
        assert_eq!(tokens, vec![Token::Word("abc\"def  ghi".to_string())]);
    }

    #[test]
    fn test_unterminated_quote_is_literal() {
        let tokens = tokenize("dogs \"black birds  and more  ");
        assert_eq!(
            tokens,
            vec![
                Token::Word("dogs".to_string()),
                Token::Quoted("\"black birds  and more".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
    }
}
