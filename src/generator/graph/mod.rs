//! 工作流状态机：具名节点组成的有向无环图，至多一个条件分支

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::generator::types::WorkflowError;

/// 终止标记
pub const END: &str = "__end__";

/// 图中的单个节点：读取状态，调用模型，返回更新后的状态
#[async_trait]
pub trait Node<S>: Send + Sync {
    async fn run(&self, state: S) -> Result<S, WorkflowError>;
}

/// 用闭包实现的节点，适合不调用模型的直通节点
pub struct FnNode<F>(pub F);

#[async_trait]
impl<S, F> Node<S> for FnNode<F>
where
    S: Send + 'static,
    F: Fn(S) -> BoxFuture<'static, Result<S, WorkflowError>> + Send + Sync,
{
    async fn run(&self, state: S) -> Result<S, WorkflowError> {
        (self.0)(state).await
    }
}

/// 条件路由：根据状态返回分支标签
pub type Router<S> = Box<dyn Fn(&S) -> &'static str + Send + Sync>;

enum Edge<S> {
    Direct(String),
    Conditional {
        router: Router<S>,
        branches: Vec<(&'static str, String)>,
    },
}

impl<S> Edge<S> {
    fn targets(&self) -> Vec<&str> {
        match self {
            Edge::Direct(to) => vec![to.as_str()],
            Edge::Conditional { branches, .. } => {
                branches.iter().map(|(_, to)| to.as_str()).collect()
            }
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("graph `{0}` has no entry point")]
    MissingEntry(String),

    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("node `{0}` is declared twice")]
    DuplicateNode(String),

    #[error("node `{0}` has no outgoing edge")]
    MissingEdge(String),

    #[error("node `{0}` has more than one outgoing edge")]
    DuplicateEdge(String),

    #[error("graph `{0}` declares more than one conditional edge")]
    MultipleConditionalEdges(String),

    #[error("cycle through node `{0}`")]
    Cycle(String),

    #[error("node `{node}` routed to unmapped branch `{label}`")]
    UnmappedBranch { node: String, label: String },
}

/// 图构建器
pub struct StateGraph<S> {
    name: String,
    nodes: Vec<(String, Arc<dyn Node<S>>)>,
    entry: Option<String>,
    edges: Vec<(String, Edge<S>)>,
}

impl<S: Send + 'static> StateGraph<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            entry: None,
            edges: Vec::new(),
        }
    }

    pub fn add_node(mut self, name: &str, node: impl Node<S> + 'static) -> Self {
        self.nodes.push((name.to_string(), Arc::new(node)));
        self
    }

    pub fn set_entry_point(mut self, name: &str) -> Self {
        self.entry = Some(name.to_string());
        self
    }

    /// `to`可以是[`END`]
    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .push((from.to_string(), Edge::Direct(to.to_string())));
        self
    }

    pub fn add_conditional_edges<R>(
        mut self,
        from: &str,
        router: R,
        branches: &[(&'static str, &str)],
    ) -> Self
    where
        R: Fn(&S) -> &'static str + Send + Sync + 'static,
    {
        self.edges.push((
            from.to_string(),
            Edge::Conditional {
                router: Box::new(router),
                branches: branches
                    .iter()
                    .map(|(label, to)| (*label, to.to_string()))
                    .collect(),
            },
        ));
        self
    }

    /// 校验图结构并冻结
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        let mut nodes: HashMap<String, Arc<dyn Node<S>>> = HashMap::new();
        for (name, node) in self.nodes {
            if name == END || nodes.contains_key(&name) {
                return Err(GraphError::DuplicateNode(name));
            }
            nodes.insert(name, node);
        }

        let entry = self
            .entry
            .ok_or_else(|| GraphError::MissingEntry(self.name.clone()))?;
        if !nodes.contains_key(&entry) {
            return Err(GraphError::UnknownNode(entry));
        }

        let mut edges: HashMap<String, Edge<S>> = HashMap::new();
        let mut conditional_count = 0;
        for (from, edge) in self.edges {
            if !nodes.contains_key(&from) {
                return Err(GraphError::UnknownNode(from));
            }
            if let Some(target) = edge
                .targets()
                .into_iter()
                .find(|to| *to != END && !nodes.contains_key(*to))
            {
                return Err(GraphError::UnknownNode(target.to_string()));
            }
            if matches!(edge, Edge::Conditional { .. }) {
                conditional_count += 1;
                if conditional_count > 1 {
                    return Err(GraphError::MultipleConditionalEdges(self.name.clone()));
                }
            }
            if edges.contains_key(&from) {
                return Err(GraphError::DuplicateEdge(from));
            }
            edges.insert(from, edge);
        }

        // 按名字排序，保证报错稳定
        let mut names: Vec<&String> = nodes.keys().collect();
        names.sort();
        if let Some(name) = names.iter().find(|name| !edges.contains_key(name.as_str())) {
            return Err(GraphError::MissingEdge(name.to_string()));
        }

        detect_cycle(&names, &edges)?;

        Ok(CompiledGraph {
            name: self.name,
            entry,
            nodes,
            edges,
        })
    }
}

fn detect_cycle<S>(names: &[&String], edges: &HashMap<String, Edge<S>>) -> Result<(), GraphError> {
    fn visit<'a, S>(
        node: &'a str,
        edges: &'a HashMap<String, Edge<S>>,
        on_path: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), GraphError> {
        if node == END || done.contains(node) {
            return Ok(());
        }
        if !on_path.insert(node) {
            return Err(GraphError::Cycle(node.to_string()));
        }
        if let Some(edge) = edges.get(node) {
            for next in edge.targets() {
                visit(next, edges, on_path, done)?;
            }
        }
        on_path.remove(node);
        done.insert(node);
        Ok(())
    }

    let mut done = HashSet::new();
    for name in names {
        visit(name.as_str(), edges, &mut HashSet::new(), &mut done)?;
    }
    Ok(())
}

/// 一次完整执行的结果
#[derive(Debug)]
pub struct GraphRun<S> {
    pub state: S,
    /// 依次执行过的节点
    pub path: Vec<String>,
}

/// 已校验的图
pub struct CompiledGraph<S> {
    name: String,
    entry: String,
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
}

impl<S: Send + 'static> CompiledGraph<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 执行单个节点
    pub async fn run_node(&self, name: &str, state: S) -> Result<S, WorkflowError> {
        let node = self
            .nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))?;
        node.run(state).await
    }

    /// 计算后继节点，`None`表示到达END
    pub fn next(&self, from: &str, state: &S) -> Result<Option<&str>, GraphError> {
        let edge = self
            .edges
            .get(from)
            .ok_or_else(|| GraphError::MissingEdge(from.to_string()))?;

        let target = match edge {
            Edge::Direct(to) => to.as_str(),
            Edge::Conditional { router, branches } => {
                let label = router(state);
                debug!("🔀 节点 {} 路由到分支 {}", from, label);
                branches
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, to)| to.as_str())
                    .ok_or_else(|| GraphError::UnmappedBranch {
                        node: from.to_string(),
                        label: label.to_string(),
                    })?
            }
        };

        Ok((target != END).then_some(target))
    }

    /// 从入口执行到END
    pub async fn invoke(&self, mut state: S) -> Result<GraphRun<S>, WorkflowError> {
        let mut path = Vec::new();
        let mut current = self.entry.clone();

        loop {
            state = self.run_node(&current, state).await?;
            path.push(current.clone());
            match self.next(&current, &state)? {
                Some(next) => current = next.to_string(),
                None => break,
            }
        }

        Ok(GraphRun { state, path })
    }
}
