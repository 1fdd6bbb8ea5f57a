//! Page numbering and flat table indexing.

/// 0-based page counter for each input, restarting whenever the document name changes.
pub fn page_numbers<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    let mut prev: Option<&str> = None;
    for name in names {
        let next = match (prev, out.last()) {
            (Some(p), Some(last)) if p == name => last + 1,
            _ => 0,
        };
        out.push(next);
        prev = Some(name);
    }
    out
}

/// Position of a table in the batch: which input page, which table on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableLocation {
    pub page_pos: usize,
    pub table_idx: usize,
}

/// Maps flat table indices back to their page using per-page table counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableIndex {
    counts: Vec<usize>,
    total: usize,
}

impl TableIndex {
    pub fn new(counts: Vec<usize>) -> Self {
        let total = counts.iter().sum();
        Self { counts, total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Locate the `flat`-th table, skipping pages that contributed none.
    pub fn locate(&self, flat: usize) -> Option<TableLocation> {
        if flat >= self.total {
            return None;
        }
        let mut page_pos = 0;
        let mut prev_count = 0;
        while flat >= prev_count + self.counts[page_pos] {
            prev_count += self.counts[page_pos];
            page_pos += 1;
        }
        Some(TableLocation {
            page_pos,
            table_idx: flat - prev_count,
        })
    }

    /// Every table location in flat order.
    pub fn iter(&self) -> impl Iterator<Item = TableLocation> + '_ {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(page_pos, &count)| {
                (0..count).map(move |table_idx| TableLocation {
                    page_pos,
                    table_idx,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers_restart_per_document() {
        let names = ["a", "a", "a", "b", "c", "c"];
        assert_eq!(page_numbers(names), vec![0, 1, 2, 0, 0, 1]);
        assert!(page_numbers([]).is_empty());
    }

    #[test]
    fn test_page_numbers_returning_document_restarts() {
        assert_eq!(page_numbers(["a", "b", "a"]), vec![0, 0, 0]);
    }

    #[test]
    fn test_locate_skips_empty_pages() {
        let index = TableIndex::new(vec![0, 2, 0, 1]);
        assert_eq!(index.total(), 3);
        assert_eq!(
            index.locate(0),
            Some(TableLocation {
                page_pos: 1,
                table_idx: 0
            })
        );
        assert_eq!(
            index.locate(1),
            Some(TableLocation {
                page_pos: 1,
                table_idx: 1
            })
        );
        assert_eq!(
            index.locate(2),
            Some(TableLocation {
                page_pos: 3,
                table_idx: 0
            })
        );
        assert_eq!(index.locate(3), None);
    }

    #[test]
    fn test_iter_matches_locate() {
        let index = TableIndex::new(vec![3, 0, 0, 2, 1]);
        let via_iter: Vec<_> = index.iter().collect();
        let via_locate: Vec<_> = (0..index.total()).filter_map(|i| index.locate(i)).collect();
        assert_eq!(via_iter, via_locate);
    }

    #[test]
    fn test_empty_index() {
        let index = TableIndex::new(vec![0, 0]);
        assert_eq!(index.total(), 0);
        assert_eq!(index.locate(0), None);
        assert_eq!(index.iter().count(), 0);
    }
}
