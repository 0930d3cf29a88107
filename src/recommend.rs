use crate::formats::Book;

pub const MAX_RECOMMENDATIONS: usize = 3;

/// Books sharing at least one tag with `current`, in collection order.
///
/// The first [`MAX_RECOMMENDATIONS`] matches win; there is no ranking by
/// overlap. A book without tags gets no recommendations.
pub fn recommendations<'a>(current: &Book, books: &'a [Book]) -> Vec<&'a Book> {
    if current.tags.is_empty() {
        return Vec::new();
    }

    books
        .iter()
        .filter(|b| b.id != current.id)
        .filter(|b| b.tags.iter().any(|tag| current.has_tag(tag)))
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: &str, tags: &[&str]) -> Book {
        let mut book = Book::new(id, id.to_uppercase());
        book.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        book
    }

    fn ids(books: Vec<&Book>) -> Vec<&str> {
        books.into_iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn shared_tags_in_collection_order() {
        let books = vec![
            tagged("a", &["x", "y"]),
            tagged("b", &["y"]),
            tagged("c", &["z"]),
            tagged("d", &["x"]),
        ];
        assert_eq!(ids(recommendations(&books[0], &books)), vec!["b", "d"]);
    }

    #[test]
    fn stops_after_three_matches() {
        let books = vec![
            tagged("e", &["x"]),
            tagged("a", &["x"]),
            tagged("b", &["x", "y", "z"]),
            tagged("c", &["x"]),
            tagged("d", &["x"]),
        ];
        let current = &books[1];
        assert_eq!(ids(recommendations(current, &books)), vec!["e", "b", "c"]);
    }

    #[test]
    fn untagged_book_gets_nothing() {
        let books = vec![tagged("a", &[]), tagged("b", &["x"])];
        assert!(recommendations(&books[0], &books).is_empty());
    }

    #[test]
    fn tags_match_exactly() {
        let books = vec![tagged("a", &["SciFi"]), tagged("b", &["scifi"])];
        assert!(recommendations(&books[0], &books).is_empty());
    }
}
