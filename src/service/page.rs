use crate::entity::Entity;

/// One page of a listing. Page numbers start at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    page_number: u64,
    items_number: u64,
    total_pages: u64,
    total_items: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0, 0, 0, 0)
    }
}

impl<T> Page<T> {
    pub fn new(
        content: Vec<T>,
        page_number: u64,
        items_number: u64,
        total_pages: u64,
        total_items: u64,
    ) -> Self {
        Self {
            content,
            page_number,
            items_number,
            total_pages,
            total_items,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn items_number(&self) -> u64 {
        self.items_number
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn has_next(&self) -> bool {
        self.total_pages > self.page_number.saturating_add(1)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }
}

impl<T: Entity> Page<T> {
    /// Resolves an entity handle inside this page.
    pub fn find(&self, key: &str) -> Option<&T> {
        self.content
            .iter()
            .find(|entity| entity.key().as_deref() == Some(key))
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
