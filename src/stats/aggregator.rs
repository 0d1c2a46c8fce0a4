use std::collections::HashMap;

use super::derived::{apply_derived, StatCategory};
use super::models::{AggregatedRecord, AggregatedRecords, FieldValue, StatRow};

/// Folds per-game rows into one record per group key.
///
/// Rows are partitioned on the `-`-joined values of `group_keys`. The first row
/// of a partition seeds the record; later rows add every numeric field that is
/// neither a group key nor listed in `exclude`. Excluded and textual fields keep
/// the seed row's value. Once all rows are folded, the derived fields for
/// `category` are attached to every record.
pub fn aggregate(
    rows: &[StatRow],
    group_keys: &[&str],
    exclude: &[&str],
    category: StatCategory,
) -> AggregatedRecords {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<AggregatedRecord> = Vec::new();

    for row in rows {
        let key = group_key(row, group_keys);
        match index.get(&key) {
            Some(&position) => {
                let target = &mut records[position].row;
                for (name, value) in &row.fields {
                    if group_keys.contains(&name.as_str()) || exclude.contains(&name.as_str()) {
                        continue;
                    }
                    let FieldValue::Number(addend) = value else {
                        continue;
                    };
                    let summed = target.number(name) + addend;
                    target.set(name, summed);
                }
            }
            None => {
                index.insert(key.clone(), records.len());
                records.push(AggregatedRecord {
                    key,
                    row: row.clone(),
                });
            }
        }
    }

    for record in &mut records {
        apply_derived(category, &mut record.row);
    }

    AggregatedRecords::from_records(records)
}

fn group_key(row: &StatRow, group_keys: &[&str]) -> String {
    group_keys
        .iter()
        .map(|name| row.key_part(name))
        .collect::<Vec<_>>()
        .join("-")
}
