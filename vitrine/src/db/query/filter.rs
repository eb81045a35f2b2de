// SPDX-License-Identifier: AGPL-3.0-or-later

use std::slice::Iter;

use crate::db::query::Value;

/// Options to represent the upper bound of an unbounded, open, closed or half-open interval.
#[derive(Debug, Clone, PartialEq)]
pub enum UpperBound {
    Unbounded,
    Lower(Value),
    LowerEqual(Value),
}

/// Options to represent the lower bound of an unbounded, open, closed or half-open interval.
#[derive(Debug, Clone, PartialEq)]
pub enum LowerBound {
    Unbounded,
    Greater(Value),
    GreaterEqual(Value),
}

/// Options of different filters which can be applied on columns.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterBy {
    /// Filter elements with exactly this value.
    Element(Value),

    /// Filter elements included in this set of values.
    Set(Vec<Value>),

    /// Filter elements inside the given interval.
    Interval(LowerBound, UpperBound),

    /// Filter elements containing this search string.
    Contains(Value),
}

/// An item representing a single filter setting.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSetting {
    /// Column this filter is applied on.
    pub field: String,

    /// Type of filter.
    pub by: FilterBy,

    /// Flag to indicate if filter is negated / inverted.
    pub exclusive: bool,
}

impl FilterSetting {
    /// Returns a new filter setting which can be added to a whole set of other filters.
    pub fn new(field: &str, by: FilterBy, exclusive: bool) -> Self {
        Self {
            field: field.to_owned(),
            by,
            exclusive,
        }
    }
}

/// Collection of filter settings which can be used further to construct a database query.
///
/// Internally this struct merges or extends added filter settings as some of them can be optimized
/// in simple ways.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Vec<FilterSetting>);

impl Filter {
    /// Returns a new `Filter` instance.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the total number of filter settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no filter settings were added.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all filter settings.
    pub fn iter(&self) -> Iter<FilterSetting> {
        self.0.iter()
    }

    /// Helper method to merge or extend existing filterings.
    ///
    /// This is a preparation step to pass on well-formed filters to the database backend, since we
    /// can't make sure that the filters were used "efficiently" by the requesting client.
    ///
    /// Note that this method does not merge across exclusivity and does not support multiple
    /// intervals for one field.
    fn upsert_filter_item(&mut self, new_item: FilterSetting) {
        let index = match self.0.iter().position(|item| item.field == new_item.field) {
            Some(index) => index,
            None => {
                self.0.push(new_item);
                return;
            }
        };

        let current_item = &mut self.0[index];

        // Boolean values for the same field we can always easily overwrite
        if let FilterBy::Element(Value::Boolean(_)) = current_item.by {
            *current_item = new_item;
            return;
        }

        // We don't merge other fields with different exclusivity, in this case just add it and
        // return early
        if current_item.exclusive != new_item.exclusive {
            self.0.push(new_item);
            return;
        }

        let updated_filter = match (current_item.by.clone(), new_item.by.clone()) {
            (FilterBy::Element(element_a), FilterBy::Element(element_b)) => {
                if element_a != element_b {
                    Some(FilterBy::Set(vec![element_a, element_b]))
                } else {
                    Some(FilterBy::Element(element_a))
                }
            }
            (FilterBy::Element(element), FilterBy::Set(mut elements))
            | (FilterBy::Set(mut elements), FilterBy::Element(element)) => {
                if !elements.contains(&element) {
                    elements.push(element);
                }

                Some(FilterBy::Set(elements))
            }
            (FilterBy::Set(mut elements_a), FilterBy::Set(elements_b)) => {
                for element in elements_b {
                    if !elements_a.contains(&element) {
                        elements_a.push(element);
                    }
                }

                Some(FilterBy::Set(elements_a))
            }
            (FilterBy::Interval(lower_a, upper_a), FilterBy::Interval(lower_b, upper_b)) => {
                match (&lower_b, &upper_b) {
                    (LowerBound::Unbounded, UpperBound::Unbounded) => {
                        Some(FilterBy::Interval(lower_a, upper_a))
                    }
                    (LowerBound::Unbounded, _) => Some(FilterBy::Interval(lower_a, upper_b)),
                    (_, UpperBound::Unbounded) => Some(FilterBy::Interval(lower_b, upper_a)),
                    _ => Some(FilterBy::Interval(lower_b, upper_b)),
                }
            }
            _ => None,
        };

        match updated_filter {
            Some(filter) => {
                current_item.by = filter;
            }
            None => {
                self.0.push(new_item);
            }
        }
    }

    /// Add an equality (eq) filter setting matching a value.
    pub fn add(&mut self, field: &str, value: &Value) {
        self.upsert_filter_item(FilterSetting::new(
            field,
            FilterBy::Element(value.to_owned()),
            false,
        ));
    }

    /// Add a filter setting (in) to match all items in the given values set.
    pub fn add_in(&mut self, field: &str, values: &[Value]) {
        let by = if values.len() == 1 {
            FilterBy::Element(values[0].to_owned())
        } else {
            FilterBy::Set(values.to_owned())
        };

        self.upsert_filter_item(FilterSetting::new(field, by, false));
    }

    /// Add a negated filter setting (not in) to match all items which are not in the given values
    /// set.
    pub fn add_not_in(&mut self, field: &str, values: &[Value]) {
        let by = if values.len() == 1 {
            FilterBy::Element(values[0].to_owned())
        } else {
            FilterBy::Set(values.to_owned())
        };

        self.upsert_filter_item(FilterSetting::new(field, by, true));
    }

    /// Add a filter setting (gte) to match all items greater than or equal the given value.
    pub fn add_gte(&mut self, field: &str, value: &Value) {
        self.upsert_filter_item(FilterSetting::new(
            field,
            FilterBy::Interval(
                LowerBound::GreaterEqual(value.to_owned()),
                UpperBound::Unbounded,
            ),
            false,
        ));
    }

    /// Add a filter setting (lte) to match all items lower than or equal the given value.
    pub fn add_lte(&mut self, field: &str, value: &Value) {
        self.upsert_filter_item(FilterSetting::new(
            field,
            FilterBy::Interval(LowerBound::Unbounded, UpperBound::LowerEqual(value.to_owned())),
            false,
        ));
    }

    /// Add a filter setting (contains) to match all items containing the given search string.
    pub fn add_contains(&mut self, field: &str, value: &str) {
        self.upsert_filter_item(FilterSetting::new(
            field,
            FilterBy::Contains(Value::String(value.to_owned())),
            false,
        ));
    }
}
