use super::{Field, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

// Constructors
impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Built-in table: `user_data`
    ///
    /// `user_id` is the primary key and the total order used by every scan.
    pub fn user_data() -> Self {
        Self::new(vec![
            Field::new("user_id", Type::Text, true),
            Field::new("name", Type::Text, false),
            Field::new("email", Type::Text, false),
            Field::new("age", Type::Decimal, false),
        ])
    }
}

impl Schema {
    /// Get the position of the key field, `None` if no field is marked as
    /// primary.
    pub fn get_key_pos(&self) -> Option<usize> {
        self.fields.iter().position(|field| field.is_primary)
    }

    pub fn get_field_pos(&self, field_name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == field_name)
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_data_layout() {
        let schema = Schema::user_data();
        assert_eq!(schema.width(), 4);
        assert_eq!(schema.get_key_pos(), Some(0));
        assert_eq!(schema.get_field_pos("age"), Some(3));
        assert_eq!(schema.get_field_pos("phone"), None);
    }
}
