use super::Output;
use anyhow::{Context, Result};
use serde_json::json;
use tabula::compiler::{AlterPlan, CreateTablePlan};
use tabula::schema::to_string_binary;
use tabula::{Arg, SchemaShell, SchemaWarning};

fn warnings_json(warnings: &[SchemaWarning]) -> Vec<String> {
    warnings.iter().map(|w| w.to_string()).collect()
}

fn print_warnings(warnings: &[SchemaWarning]) {
    for warning in warnings {
        eprintln!("WARNING: {}", warning);
    }
}

fn print_create(plan: &CreateTablePlan, applied: bool, output: Output) -> Result<()> {
    let splits: Vec<String> = plan.splits.iter().map(|k| to_string_binary(k)).collect();
    if output.json {
        return output.print_json(&json!({
            "applied": applied,
            "descriptor": plan.descriptor,
            "split_mode": plan.split_spec.as_ref().map(|s| s.mode()),
            "splits": splits,
            "warnings": warnings_json(&plan.warnings),
        }));
    }

    print_warnings(&plan.warnings);
    print!("{}", plan.descriptor);
    if !splits.is_empty() {
        println!("SPLITS => [{}]", splits.join(", "));
    }
    println!(
        "{} table {} with {} region(s)",
        if applied { "Created" } else { "Would create" },
        plan.descriptor.name,
        splits.len() + 1
    );
    Ok(())
}

fn print_alter(plan: &AlterPlan, applied: bool, output: Output) -> Result<()> {
    let intents: Vec<&str> = plan.intents.iter().map(|i| i.kind()).collect();
    if output.json {
        return output.print_json(&json!({
            "applied": applied,
            "dirty": plan.dirty,
            "intents": intents,
            "descriptor": plan.descriptor,
            "warnings": warnings_json(&plan.warnings),
        }));
    }

    print_warnings(&plan.warnings);
    if !plan.dirty {
        println!("Nothing to alter for table {}", plan.descriptor.name);
        return Ok(());
    }
    print!("{}", plan.descriptor);
    println!(
        "{} table {} ({})",
        if applied { "Altered" } else { "Would alter" },
        plan.descriptor.name,
        intents.join(", ")
    );
    Ok(())
}

/// Create a table, or only print the compiled plan with `dry_run`.
pub async fn run_create(
    shell: &SchemaShell,
    table: &str,
    args: &[Arg],
    dry_run: bool,
    output: Output,
) -> Result<()> {
    let plan = if dry_run {
        shell.plan_create(table, args)
    } else {
        shell.create_table(table, args).await
    }
    .with_context(|| format!("Failed to create table '{}'", table))?;
    print_create(&plan, !dry_run, output)
}

pub async fn run_alter(
    shell: &SchemaShell,
    table: &str,
    args: &[Arg],
    dry_run: bool,
    output: Output,
) -> Result<()> {
    let plan = if dry_run {
        shell.plan_alter(table, args).await
    } else {
        shell.alter_table(table, args).await
    }
    .with_context(|| format!("Failed to alter table '{}'", table))?;
    print_alter(&plan, !dry_run && plan.dirty, output)
}

pub async fn run_describe(
    shell: &SchemaShell,
    table: &str,
    attributes_only: bool,
    output: Output,
) -> Result<()> {
    if attributes_only {
        let summary = shell.get_table_attributes(table).await?;
        if output.json {
            return output.print_json(&json!({ "attributes": summary }));
        }
        println!("{}", summary);
        return Ok(());
    }

    let descriptor = shell
        .describe(table)
        .await
        .with_context(|| format!("Failed to describe table '{}'", table))?;
    if output.json {
        return output.print_json(&descriptor);
    }
    print!("{}", descriptor);
    Ok(())
}

pub async fn run_list(shell: &SchemaShell, pattern: Option<&str>, output: Output) -> Result<()> {
    let tables = shell.list_tables(pattern).await?;
    if output.json {
        let names: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
        return output.print_json(&names);
    }
    println!("TABLE");
    for table in &tables {
        println!("{}", table);
    }
    println!("{} row(s)", tables.len());
    Ok(())
}
