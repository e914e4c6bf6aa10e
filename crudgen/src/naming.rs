//! Naming helpers shared by the resolver and the template helpers
//!
//! Table and column names arrive in `snake_case` from MySQL; generated code
//! needs them in several casing conventions. All conversions go through
//! Inflector so the CLI helpers and the resolver agree on every identifier.

use inflector::Inflector;

/// Case conversions used for derived identifiers
pub struct Naming;

impl Naming {
    /// Convert to `UpperCamelCase`
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// assert_eq!(Naming::case_camel("sys_user"), "SysUser");
    /// assert_eq!(Naming::case_camel("order"), "Order");
    /// ```
    #[must_use]
    pub fn case_camel(input: &str) -> String {
        input.to_pascal_case()
    }

    /// Convert to `lowerCamelCase`
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// assert_eq!(Naming::case_camel_lower("dept_id"), "deptId");
    /// assert_eq!(Naming::case_camel_lower("name"), "name");
    /// ```
    #[must_use]
    pub fn case_camel_lower(input: &str) -> String {
        input.to_camel_case()
    }

    /// Convert to `snake_case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// assert_eq!(Naming::case_snake("SysUser"), "sys_user");
    /// ```
    #[must_use]
    pub fn case_snake(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert to `kebab-case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// assert_eq!(Naming::case_kebab("sys_user"), "sys-user");
    /// ```
    #[must_use]
    pub fn case_kebab(input: &str) -> String {
        input.to_kebab_case()
    }

    /// Kebab-case every `/`-separated segment of a module path
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// assert_eq!(Naming::kebab_path("system/userCenter"), "system/user-center");
    /// ```
    #[must_use]
    pub fn kebab_path(input: &str) -> String {
        input
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(Inflector::to_kebab_case)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Upper-case the first character, leaving the rest untouched
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// assert_eq!(Naming::uc_first("userName"), "UserName");
    /// assert_eq!(Naming::uc_first(""), "");
    /// ```
    #[must_use]
    pub fn uc_first(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }

    /// Remove the first matching prefix from a table name
    ///
    /// Only one prefix is removed, and only once.
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::naming::Naming;
    /// let prefixes = vec!["sys_".to_string(), "t_".to_string()];
    /// assert_eq!(Naming::strip_table_prefix("sys_user", &prefixes), "user");
    /// assert_eq!(Naming::strip_table_prefix("order", &prefixes), "order");
    /// ```
    #[must_use]
    pub fn strip_table_prefix(table_name: &str, prefixes: &[String]) -> String {
        prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| table_name.strip_prefix(prefix.as_str()))
            .unwrap_or(table_name)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(Naming::case_camel("sys_dept"), "SysDept");
        assert_eq!(Naming::case_camel_lower("customer_id"), "customerId");
        assert_eq!(Naming::case_snake("OrderItem"), "order_item");
        assert_eq!(Naming::case_kebab("order_item"), "order-item");
    }

    #[test]
    fn test_kebab_path_skips_empty_segments() {
        assert_eq!(Naming::kebab_path("/system/dictData/"), "system/dict-data");
        assert_eq!(Naming::kebab_path(""), "");
    }

    #[test]
    fn test_strip_table_prefix_only_first_match() {
        let prefixes = vec!["t_".to_string(), "t_sys_".to_string()];
        assert_eq!(Naming::strip_table_prefix("t_sys_user", &prefixes), "sys_user");
    }

    #[test]
    fn test_strip_table_prefix_ignores_empty_prefix() {
        let prefixes = vec![String::new()];
        assert_eq!(Naming::strip_table_prefix("sys_user", &prefixes), "sys_user");
    }

    #[test]
    fn test_uc_first_keeps_tail() {
        assert_eq!(Naming::uc_first("rltdOrder"), "RltdOrder");
    }
}
