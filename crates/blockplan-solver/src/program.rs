//! Solver-independent linear program model.
//!
//! A [`LinearProgram`] owns its variables, constraints and objective so it
//! can be handed to any [`MilpEngine`](crate::MilpEngine), including one that
//! solves on another thread.

use std::collections::BTreeMap;
use std::fmt;

/// Index of a variable within its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declaration of a decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub lower: f64,
    /// `None` for unbounded above.
    pub upper: Option<f64>,
    pub integer: bool,
}

impl VariableDef {
    /// Non-negative integer variable, unbounded above.
    pub fn non_negative_integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: None,
            integer: true,
        }
    }

    pub fn with_upper(mut self, upper: Option<f64>) -> Self {
        self.upper = upper;
        self
    }
}

/// Affine expression `Σ coef × var + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_const(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn from_var(var: VarId, coef: f64) -> Self {
        let mut e = Self::zero();
        e.add_term(var, coef);
        e
    }

    /// Adds `coef × var`, dropping terms that cancel out.
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coef;
        if entry.abs() <= 1e-12 {
            self.terms.remove(&var);
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn add_inplace(&mut self, other: &LinearExpr) {
        self.constant += other.constant;
        for (var, coef) in &other.terms {
            self.add_term(*var, *coef);
        }
    }

    pub fn sub_inplace(&mut self, other: &LinearExpr) {
        self.constant -= other.constant;
        for (var, coef) in &other.terms {
            self.add_term(*var, -*coef);
        }
    }

    pub fn scale(&self, k: f64) -> Self {
        let mut e = Self::from_const(self.constant * k);
        for (var, coef) in &self.terms {
            e.add_term(*var, coef * k);
        }
        e
    }

    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression for an assignment indexed by [`VarId`].
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coef)| coef * values.get(var.0).copied().unwrap_or(0.0))
                .sum::<f64>()
    }
}

/// Comparison of a constraint's left-hand side with its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
        })
    }
}

/// `expr sense rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// True when `values` satisfy the constraint within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.eval(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tolerance,
            Sense::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

/// A mixed-integer linear program with a maximized objective.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    name: String,
    objective: LinearExpr,
    variables: Vec<VariableDef>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn maximize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objective: LinearExpr::zero(),
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_variable(&mut self, def: VariableDef) -> VarId {
        self.variables.push(def);
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            expr,
            sense,
            rhs,
        });
    }

    /// Adds `expr` to the objective.
    pub fn add_objective(&mut self, expr: &LinearExpr) {
        self.objective.add_inplace(expr);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> &VariableDef {
        &self.variables[var.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Names of the constraints and bounds violated by `values`.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violated: Vec<String> = self
            .constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tolerance))
            .map(|c| c.name.clone())
            .collect();
        for (idx, def) in self.variables.iter().enumerate() {
            let value = values.get(idx).copied().unwrap_or(0.0);
            let below = value < def.lower - tolerance;
            let above = def.upper.is_some_and(|u| value > u + tolerance);
            if below || above {
                violated.push(format!("bounds of {}", def.name));
            }
        }
        violated
    }
}
