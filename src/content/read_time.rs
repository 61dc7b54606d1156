//! Read time estimation

use super::richtext::as_text;
use super::ContentBlock;

/// Reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of whitespace-separated words in a block body
pub fn word_count(block: &ContentBlock) -> usize {
    as_text(&block.body).split_whitespace().count()
}

/// Estimated minutes to read a post
///
/// Each block contributes `ceil(words / 200)` minutes; a block without words
/// contributes nothing. An empty post reads in 0 minutes.
pub fn estimate(blocks: &[ContentBlock]) -> u32 {
    blocks
        .iter()
        .map(|block| word_count(block).div_ceil(WORDS_PER_MINUTE) as u32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextBlock;

    fn block(words: usize) -> ContentBlock {
        let text = vec!["palavra"; words].join(" ");
        ContentBlock {
            heading: "Seção".to_string(),
            body: vec![RichTextBlock::paragraph(text)],
        }
    }

    #[test]
    fn test_empty_post() {
        assert_eq!(estimate(&[]), 0);
    }

    #[test]
    fn test_empty_block_adds_nothing() {
        let empty = ContentBlock {
            heading: "Vazio".to_string(),
            body: Vec::new(),
        };
        assert_eq!(estimate(&[empty.clone()]), 0);
        assert_eq!(estimate(&[block(0)]), 0);
        assert_eq!(estimate(&[empty, block(10)]), 1);
    }

    #[test]
    fn test_single_block_rounds_up() {
        assert_eq!(estimate(&[block(1)]), 1);
        assert_eq!(estimate(&[block(200)]), 1);
        assert_eq!(estimate(&[block(201)]), 2);
        assert_eq!(estimate(&[block(1000)]), 5);
    }

    #[test]
    fn test_blocks_are_rounded_separately() {
        // 150 + 150 words: one minute each
        assert_eq!(estimate(&[block(150), block(150)]), 2);
    }

    #[test]
    fn test_whitespace_runs_are_one_separator() {
        let messy = ContentBlock {
            heading: String::new(),
            body: vec![
                RichTextBlock::paragraph("  um   dois\n\ttrês  "),
                RichTextBlock::paragraph(""),
            ],
        };
        assert_eq!(word_count(&messy), 3);
    }

    #[test]
    fn test_deterministic() {
        let blocks = vec![block(321), block(45)];
        assert_eq!(estimate(&blocks), estimate(&blocks));
        assert_eq!(estimate(&blocks), 3);
    }
}
