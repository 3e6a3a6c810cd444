// Search form feeding filters to the composing view.
//
// The form performs no validation: empty fields are valid and mean "no
// filter". Resetting pagination is the composing view's job.
use crate::client::query::ListFilters;

pub type SearchCallback = Box<dyn FnMut(ListFilters) + Send>;

pub struct SearchForm {
    name: String,
    date: String,
    on_search: SearchCallback,
}

impl SearchForm {
    pub fn new(on_search: impl FnMut(ListFilters) + Send + 'static) -> Self {
        Self {
            name: String::new(),
            date: String::new(),
            on_search: Box::new(on_search),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn submit(&mut self) {
        let filters = ListFilters::new(self.name.clone(), self.date.clone());
        (self.on_search)(filters);
    }

    /// Clear both fields and search with no filters.
    pub fn show_all(&mut self) {
        self.name.clear();
        self.date.clear();
        (self.on_search)(ListFilters::all());
    }
}

impl std::fmt::Debug for SearchForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchForm")
            .field("name", &self.name)
            .field("date", &self.date)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_form() -> (SearchForm, Arc<Mutex<Vec<ListFilters>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let form = SearchForm::new(move |filters| sink.lock().expect("lock").push(filters));
        (form, seen)
    }

    #[test]
    fn submit_passes_fields() {
        let (mut form, seen) = recording_form();
        form.set_name("Ali");
        form.set_date("2024-05-01");
        form.submit();
        assert_eq!(
            seen.lock().expect("lock").as_slice(),
            &[ListFilters::new("Ali", "2024-05-01")]
        );
    }

    #[test]
    fn empty_fields_are_valid() {
        let (mut form, seen) = recording_form();
        form.submit();
        assert!(seen.lock().expect("lock")[0].is_empty());
    }

    #[test]
    fn show_all_clears_fields() {
        let (mut form, seen) = recording_form();
        form.set_name("Ali");
        form.show_all();
        assert_eq!(form.name(), "");
        assert_eq!(form.date(), "");
        assert_eq!(seen.lock().expect("lock").as_slice(), &[ListFilters::all()]);
    }
}
