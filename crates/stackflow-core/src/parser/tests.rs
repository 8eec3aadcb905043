use super::*;
use crate::model::{AttributeRef, ConfigValue, ResourceKind};

#[test]
fn test_parse_full_stack() {
    let kdl = r#"
        stack "e2e-diagnostics"

        resource "group" kind="resourceGroup" {
            name "e2e-diagnostics"
            config {
                location "East US"
            }
        }

        resource "storage" kind="storage" {
            name "storagee2ediag01"
            depends-on "group"
            config {
                resource-group ref="group.name"
                sku "Standard_LRS"
            }
        }

        output "STORAGE_CONNECTION_STRING" ref="storage.connectionString"
    "#;

    let stack = parse_stack_str(kdl, "unnamed").unwrap();
    assert_eq!(stack.name, "e2e-diagnostics");
    assert_eq!(stack.resources.len(), 2);
    assert_eq!(stack.resources[0].name, "group");
    assert_eq!(stack.resources[0].kind, ResourceKind::ResourceGroup);
    assert_eq!(stack.resources[1].name, "storage");
    assert_eq!(stack.outputs.len(), 1);
    assert_eq!(
        stack.outputs[0].source,
        AttributeRef::new("storage", "connectionString")
    );
}

#[test]
fn test_parse_keeps_file_order() {
    let kdl = r#"
        resource "web" kind="webApp"
        resource "plan" kind="servicePlan"
        resource "group" kind="resourceGroup"
    "#;

    let stack = parse_stack_str(kdl, "ordered").unwrap();
    let names: Vec<_> = stack.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["web", "plan", "group"]);
}

#[test]
fn test_parse_default_name() {
    let stack = parse_stack_str(r#"resource "g" kind="group""#, "fallback").unwrap();
    assert_eq!(stack.name, "fallback");
}

#[test]
fn test_parse_ignores_variables_block() {
    let kdl = r#"
        variables {
            location "Japan East"
        }
        resource "group" kind="resourceGroup" {
            config {
                location "Japan East"
            }
        }
    "#;

    let stack = parse_stack_str(kdl, "vars").unwrap();
    assert_eq!(stack.resources.len(), 1);
    assert_eq!(
        stack.resources[0].config["location"],
        ConfigValue::literal("Japan East")
    );
}

#[test]
fn test_parse_invalid_kdl() {
    let result = parse_stack_str("resource \"broken", "bad");
    assert!(matches!(result, Err(crate::StackError::KdlParse(_))));
}

#[test]
fn test_parse_does_not_validate_graph() {
    // 未定義リソースへの参照はグラフ構築時に検出する
    let kdl = r#"
        resource "function" kind="functionApp" {
            config {
                storage-account ref="missing.name"
            }
        }
    "#;

    let stack = parse_stack_str(kdl, "lenient").unwrap();
    assert_eq!(stack.resources[0].dependencies(), vec!["missing"]);
}
