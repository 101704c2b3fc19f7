// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Thin CLI front-end.
//!
//! Per the governing spec, the CLI is an external collaborator: every
//! sub-command loads a `Store`, calls exactly one public core operation,
//! and (for mutations) saves — it carries no logic the core doesn't
//! already expose. This mirrors the teacher's `cli::router` dispatch, cut
//! down from a handler registry to a plain `match` since there is no
//! growing command surface to register ahead of time here.

use crate::pathkv::config::PathKvConfig;
use crate::pathkv::error::{invalid_argument, PathKvResult};
use crate::pathkv::store::Store;
use crate::pathkv::text::emitter::{self, EmitOptions};
use crate::pathkv::text::parser;
use crate::pathkv::{hierarchy, interp};

/// Dispatches a single CLI invocation and returns its textual output.
///
/// ## Input
/// - `args`: the process argument vector with `argv[0]` already stripped.
///
/// ## Error Conditions
/// - Any `PathKvError` surfaced by the underlying `Store`/parser/emitter
///   call, plus `InvalidArgument` for an unrecognised or incomplete
///   command line.
pub fn run(args: Vec<String>) -> PathKvResult<String> {
    let json = has_flag(&args, "--json");
    let args: Vec<String> = args.into_iter().filter(|a| a != "--json").collect();

    let mut args = args.into_iter();
    let command = args
        .next()
        .ok_or_else(|| invalid_argument("command", "no sub-command given"))?;
    let rest: Vec<String> = args.collect();

    let result = match command.as_str() {
        "load" => cmd_load(&rest),
        "save" => cmd_save(&rest),
        "get" => cmd_get(&rest),
        "set" => cmd_set(&rest),
        "remove" => cmd_remove(&rest),
        "keys" => cmd_keys(&rest),
        "has-value" => cmd_has_value(&rest),
        "has-keys" => cmd_has_keys(&rest),
        "exists" => cmd_exists(&rest),
        other => Err(invalid_argument("command", format!("unknown sub-command '{}'", other))),
    }?;

    if json {
        Ok(serde_json::json!({ "result": result }).to_string())
    } else {
        Ok(result)
    }
}

fn require_arg<'a>(args: &'a [String], idx: usize, name: &str) -> PathKvResult<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| invalid_argument(name, "missing argument"))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn load_store(path: &str) -> PathKvResult<Store> {
    let mut store = Store::with_config(PathKvConfig::default());
    parser::load_file(&mut store, path)?;
    Ok(store)
}

fn cmd_load(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let mut store = load_store(path)?;
    Ok(format!("loaded {} entries from {}", store.size(), path))
}

fn cmd_save(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let mut store = load_store(path)?;
    let options = EmitOptions {
        align: has_flag(args, "--align"),
        interpolate: has_flag(args, "--interp"),
    };
    emitter::save_file(&mut store, path, options)?;
    Ok(format!("saved {}", path))
}

fn cmd_get(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let key = require_arg(args, 1, "key")?;
    let mut store = load_store(path)?;
    let raw = store.get(key.as_bytes())?;
    match raw {
        None => Ok("(absent)".to_string()),
        Some(value) => {
            let value = if has_flag(args, "--interp") {
                interp::interpolate(&mut store, &value)?
            } else {
                value
            };
            Ok(String::from_utf8_lossy(&value).into_owned())
        }
    }
}

fn cmd_set(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let key = require_arg(args, 1, "key")?;
    let value = require_arg(args, 2, "value")?;
    let mut store = load_store(path)?;
    store.set(key.as_bytes(), value.as_bytes())?;
    emitter::save_file(&mut store, path, EmitOptions::default())?;
    Ok(format!("set {}", key))
}

fn cmd_remove(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let key = require_arg(args, 1, "key")?;
    let mut store = load_store(path)?;
    store.remove(key.as_bytes())?;
    emitter::save_file(&mut store, path, EmitOptions::default())?;
    Ok(format!("removed {}", key))
}

fn cmd_keys(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let sub_path = args.get(1).map(String::as_str).unwrap_or("");
    let mut store = load_store(path)?;
    let keys = hierarchy::get_keys(&mut store, sub_path.as_bytes());
    Ok(keys
        .iter()
        .map(|k| String::from_utf8_lossy(k).into_owned())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn cmd_has_value(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let key = require_arg(args, 1, "key")?;
    let mut store = load_store(path)?;
    Ok(hierarchy::has_value(&mut store, key.as_bytes()).to_string())
}

fn cmd_has_keys(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let sub_path = require_arg(args, 1, "path")?;
    let mut store = load_store(path)?;
    Ok(hierarchy::has_keys(&mut store, sub_path.as_bytes()).to_string())
}

fn cmd_exists(args: &[String]) -> PathKvResult<String> {
    let path = require_arg(args, 0, "file")?;
    let key_or_path = require_arg(args, 1, "key-or-path")?;
    let mut store = load_store(path)?;
    Ok(hierarchy::exists(&mut store, key_or_path.as_bytes()).to_string())
}
