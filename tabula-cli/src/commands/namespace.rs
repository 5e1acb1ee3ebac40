use super::Output;
use anyhow::{Context, Result};
use tabula::descriptor::NamespaceDescriptor;
use tabula::{Arg, SchemaShell};

fn print_namespace(ns: &NamespaceDescriptor, output: Output) -> Result<()> {
    if output.json {
        return output.print_json(ns);
    }
    println!("DESCRIPTION");
    println!("{}", ns);
    Ok(())
}

pub async fn run_create_namespace(
    shell: &SchemaShell,
    name: &str,
    args: &[Arg],
    output: Output,
) -> Result<()> {
    let ns = shell
        .create_namespace(name, args)
        .await
        .with_context(|| format!("Failed to create namespace '{}'", name))?;
    print_namespace(&ns, output)
}

pub async fn run_alter_namespace(
    shell: &SchemaShell,
    name: &str,
    args: &[Arg],
    output: Output,
) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("alter-namespace needs at least one METHOD bag");
    }
    let ns = shell
        .alter_namespace(name, args)
        .await
        .with_context(|| format!("Failed to alter namespace '{}'", name))?;
    print_namespace(&ns, output)
}

pub async fn run_describe_namespace(shell: &SchemaShell, name: &str, output: Output) -> Result<()> {
    let ns = shell
        .describe_namespace(name)
        .await
        .with_context(|| format!("Failed to describe namespace '{}'", name))?;
    print_namespace(&ns, output)
}
