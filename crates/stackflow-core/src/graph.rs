//! 依存グラフ
//!
//! リソース定義の依存関係を検証し、実行順序を決定します。

use crate::error::{Result, StackError};
use crate::model::ResourceDescriptor;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// 検証済みの依存グラフ
///
/// ノードは入力順のインデックスで管理する。
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    names: Vec<String>,
    dependencies: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl DependencyGraph {
    /// グラフを構築して検証する
    ///
    /// 重複名・未定義の依存先・循環依存はここでエラーになる。
    /// 実行順序は Kahn のアルゴリズムで、実行可能なノードが複数ある場合は
    /// 入力順の早いものを優先する。
    pub fn build(resources: &[ResourceDescriptor]) -> Result<Self> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(resources.len());
        for (i, resource) in resources.iter().enumerate() {
            if index.insert(resource.name.as_str(), i).is_some() {
                return Err(StackError::DuplicateResource(resource.name.clone()));
            }
        }

        let mut dependencies = vec![Vec::new(); resources.len()];
        let mut dependents = vec![Vec::new(); resources.len()];
        for (i, resource) in resources.iter().enumerate() {
            for dep in resource.dependencies() {
                let j = *index
                    .get(dep)
                    .ok_or_else(|| StackError::UnknownDependency {
                        resource: resource.name.clone(),
                        dependency: dep.to_string(),
                    })?;
                dependencies[i].push(j);
                dependents[j].push(i);
            }
        }

        let names: Vec<String> = resources.iter().map(|r| r.name.clone()).collect();
        let order = topological_order(&dependencies, &dependents).map_err(|remaining| {
            StackError::CyclicDependency(find_cycle(&remaining, &dependencies, &names))
        })?;

        debug!(
            order = ?order.iter().map(|&i| names[i].as_str()).collect::<Vec<_>>(),
            "Computed execution order"
        );

        Ok(Self {
            names,
            dependencies,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 実行順（入力インデックス）
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// 実行順（リソース名）
    pub fn execution_order(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.names[i].as_str()).collect()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// 直接の依存先
    pub fn dependencies_of(&self, index: usize) -> &[usize] {
        &self.dependencies[index]
    }
}

/// Kahn のアルゴリズム
///
/// 循環がある場合は処理できなかったノードを返す。
fn topological_order(
    dependencies: &[Vec<usize>],
    dependents: &[Vec<usize>],
) -> std::result::Result<Vec<usize>, Vec<usize>> {
    let mut in_degree: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(dependencies.len());
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() == dependencies.len() {
        Ok(order)
    } else {
        Err((0..dependencies.len())
            .filter(|&i| in_degree[i] > 0)
            .collect())
    }
}

/// 残ったノードから循環経路を1つ取り出す
///
/// 残ったノードは必ず未処理の依存先を持つので、依存先をたどれば
/// いずれ同じノードに戻る。
fn find_cycle(remaining: &[usize], dependencies: &[Vec<usize>], names: &[String]) -> Vec<String> {
    let Some(&start) = remaining.first() else {
        return Vec::new();
    };

    let mut path: Vec<usize> = Vec::new();
    let mut current = start;
    loop {
        if let Some(pos) = path.iter().position(|&n| n == current) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|&i| names[i].clone()).collect();
            cycle.push(names[current].clone());
            return cycle;
        }
        path.push(current);
        match dependencies[current]
            .iter()
            .find(|d| remaining.contains(d))
        {
            Some(&next) => current = next,
            None => return path.iter().map(|&i| names[i].clone()).collect(),
        }
    }
}
