//! Radio button group option registry
//!
//! A radio button group is stored in a PDF as one parent field and one kid
//! widget per option. Field settings select an option by its position, while
//! the document graph needs the option's appearance state name. A
//! [`RadioGroupRegistry`] translates between the two for one named group.

use crate::error::{Error, Result};

/// Ordered option identities of one radio button group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioGroupRegistry {
    name: String,
    options: Vec<String>,
}

impl RadioGroupRegistry {
    /// Create a registry for the group `name`
    ///
    /// The options must be given in the order of the group's kids. An empty
    /// option list is a configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use expense_report_filler::form::RadioGroupRegistry;
    ///
    /// let group = RadioGroupRegistry::new("Group4", ["Dépôt", "Chèque"]).unwrap();
    /// assert_eq!(group.get(-1).unwrap(), "Chèque");
    /// assert_eq!(group.index_of("Dépôt").unwrap(), 0);
    /// ```
    pub fn new<N, I, S>(name: N, options: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let options: Vec<String> = options.into_iter().map(Into::into).collect();

        if options.is_empty() {
            return Err(Error::EmptyRadioGroup { group: name });
        }

        Ok(Self { name, options })
    }

    /// Name of the radio button field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always false, a registry holds at least one option
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Zero-based position designated by `index`
    ///
    /// Negative indices count from the end, `-1` being the last option.
    pub fn position(&self, index: isize) -> Result<usize> {
        let len = self.options.len() as isize;
        let position = if index < 0 { index + len } else { index };

        if (0..len).contains(&position) {
            Ok(position as usize)
        } else {
            Err(Error::IndexOutOfRange {
                group: self.name.clone(),
                index,
                len: self.options.len(),
            })
        }
    }

    /// Identity of the option at `index`
    pub fn get(&self, index: isize) -> Result<&str> {
        let position = self.position(index)?;
        Ok(&self.options[position])
    }

    /// Whether [`get`](Self::get) would succeed for `index`
    pub fn has_index(&self, index: isize) -> bool {
        self.position(index).is_ok()
    }

    /// Position of the option named `identity`
    pub fn index_of(&self, identity: &str) -> Result<usize> {
        self.options
            .iter()
            .position(|option| option == identity)
            .ok_or_else(|| Error::IdentityNotFound {
                group: self.name.clone(),
                identity: identity.to_string(),
            })
    }

    /// Option identities in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.options.iter()
    }
}

impl<'a> IntoIterator for &'a RadioGroupRegistry {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment_group() -> RadioGroupRegistry {
        RadioGroupRegistry::new("Group4", ["Dépôt", "Chèque"]).unwrap()
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let result = RadioGroupRegistry::new("G", Vec::<String>::new());
        match result {
            Err(Error::EmptyRadioGroup { group }) => assert_eq!(group, "G"),
            other => panic!("Expected EmptyRadioGroup, got {:?}", other),
        }
    }

    #[test]
    fn test_len_and_name() {
        let group = payment_group();
        assert_eq!(group.name(), "Group4");
        assert_eq!(group.len(), 2);
        assert!(!group.is_empty());
    }

    #[test]
    fn test_get_positive_indices() {
        let group = payment_group();
        assert_eq!(group.get(0).unwrap(), "Dépôt");
        assert_eq!(group.get(1).unwrap(), "Chèque");
    }

    #[test]
    fn test_get_negative_indices() {
        let group = payment_group();
        assert_eq!(group.get(-1).unwrap(), group.get(1).unwrap());
        assert_eq!(group.get(-2).unwrap(), "Dépôt");
        assert_eq!(group.position(-1).unwrap(), 1);
    }

    #[test]
    fn test_out_of_range_names_group_and_index() {
        let group = payment_group();

        for index in [2, 5, -3, isize::MIN, isize::MAX] {
            assert!(!group.has_index(index), "index {} should be out of range", index);
            let err = group.get(index).unwrap_err();
            assert!(matches!(err, Error::IndexOutOfRange { .. }));
            let message = err.to_string();
            assert!(message.contains("Group4"), "{}", message);
            assert!(message.contains(&index.to_string()), "{}", message);
        }
    }

    #[test]
    fn test_has_index_agrees_with_get() {
        let group = RadioGroupRegistry::new("Group1", ["Choix1", "Choix2", "Choix3"]).unwrap();
        for index in -5..5 {
            assert_eq!(group.has_index(index), group.get(index).is_ok());
        }
    }

    #[test]
    fn test_index_round_trip() {
        let group = RadioGroupRegistry::new("Group1", ["Choix1", "Choix2", "Choix3"]).unwrap();
        for i in 0..group.len() {
            let identity = group.get(i as isize).unwrap();
            assert_eq!(group.index_of(identity).unwrap(), i);
        }
    }

    #[test]
    fn test_index_of_missing_identity() {
        let group = payment_group();
        let err = group.index_of("Virement").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Group4"));
        assert!(message.contains("Virement"));
    }

    #[test]
    fn test_iteration_restarts() {
        let group = payment_group();
        let first: Vec<&String> = group.iter().collect();
        let second: Vec<&String> = (&group).into_iter().collect();
        assert_eq!(first, vec!["Dépôt", "Chèque"]);
        assert_eq!(first, second);
    }
}
